//! Platform detection for platform-dependent feature defaults.
//!
//! Detection is a pure function of the user agent string, so hosts pass a
//! `Platform` explicitly instead of the features consulting any global state.

/// Engine flags relevant to content edit defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    /// Blink-based Chrome. Edge is not counted even though its user agent
    /// also says Chrome.
    pub chrome: bool,
    /// Legacy Trident engine (Internet Explorer).
    pub trident: bool,
}

impl Platform {
    /// Detect from a user agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.to_lowercase();

        // Chrome (but not Edge, which also contains Chrome)
        let chrome = user_agent.contains("chrome") && !user_agent.contains("edg");

        let trident = user_agent.contains("trident/") || user_agent.contains("msie ");

        Platform { chrome, trident }
    }

    /// Whether the engine leaves a list by itself when Enter is pressed in an
    /// empty list item.
    pub fn exits_list_on_enter(&self) -> bool {
        !(self.trident || self.chrome)
    }
}
