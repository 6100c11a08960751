//! Snapshot-based undo/redo.
//!
//! Every step stores the editor state before and after a change. A step
//! recorded with `can_undo_by_backspace` arms the stack so that the very next
//! Backspace reverts that step instead of deleting a character; any other
//! input disarms it, and so does letting the backspace window pass.

use std::time::Duration;

use content_edit_core::ChangeSource;
use web_time::Instant;

/// How long an armed step stays revertible by Backspace.
pub const DEFAULT_BACKSPACE_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// One recorded change.
#[derive(Debug, Clone)]
pub struct UndoStep<S> {
    before: S,
    after: S,
    pub source: ChangeSource,
    pub can_undo_by_backspace: bool,
    pub recorded_at: Instant,
}

/// Bounded undo/redo history of editor states.
#[derive(Debug, Clone)]
pub struct UndoStack<S> {
    undo_stack: Vec<UndoStep<S>>,
    redo_stack: Vec<UndoStep<S>>,
    max_steps: usize,
    backspace_armed: bool,
    backspace_window: Duration,
}

impl<S: Clone> Default for UndoStack<S> {
    fn default() -> Self {
        Self::new(100)
    }
}

impl<S: Clone> UndoStack<S> {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
            backspace_armed: false,
            backspace_window: DEFAULT_BACKSPACE_UNDO_WINDOW,
        }
    }

    pub fn with_backspace_window(mut self, window: Duration) -> Self {
        self.backspace_window = window;
        self
    }

    pub fn record(&mut self, source: ChangeSource, can_undo_by_backspace: bool, before: S, after: S) {
        // Clear redo stack on new edit
        self.redo_stack.clear();

        self.undo_stack.push(UndoStep {
            before,
            after,
            source,
            can_undo_by_backspace,
            recorded_at: Instant::now(),
        });
        self.backspace_armed = can_undo_by_backspace;

        // Trim if over max
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
        tracing::trace!(source = source.as_str(), depth = self.undo_stack.len(), "undo step recorded");
    }

    /// Step back. Returns the state to restore.
    pub fn undo(&mut self) -> Option<S> {
        let step = self.undo_stack.pop()?;
        let state = step.before.clone();
        self.redo_stack.push(step);
        self.backspace_armed = false;
        Some(state)
    }

    /// Re-apply the last undone step. Returns the state to restore.
    pub fn redo(&mut self) -> Option<S> {
        let step = self.redo_stack.pop()?;
        let state = step.after.clone();
        self.undo_stack.push(step);
        self.backspace_armed = false;
        Some(state)
    }

    /// Undo the last step if it was recorded as backspace-undoable, nothing
    /// happened since, and it is still inside the backspace window.
    pub fn undo_by_backspace(&mut self) -> Option<S> {
        self.undo_by_backspace_at(Instant::now())
    }

    fn undo_by_backspace_at(&mut self, now: Instant) -> Option<S> {
        if !self.backspace_armed {
            return None;
        }
        let recorded_at = self.undo_stack.last()?.recorded_at;
        let age = now.saturating_duration_since(recorded_at);
        if age > self.backspace_window {
            tracing::trace!(?age, "backspace undo window elapsed");
            self.backspace_armed = false;
            return None;
        }
        self.undo()
    }

    pub fn disarm_backspace_undo(&mut self) {
        self.backspace_armed = false;
    }

    pub fn is_backspace_armed(&self) -> bool {
        self.backspace_armed
    }

    pub fn last_step(&self) -> Option<&UndoStep<S>> {
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.backspace_armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(stack: &mut UndoStack<String>, before: &str, after: &str) {
        stack.record(ChangeSource::Keyboard, false, before.to_string(), after.to_string());
    }

    #[test]
    fn test_undo_redo() {
        let mut stack = UndoStack::new(100);
        assert!(!stack.can_undo());

        step(&mut stack, "hello", "hello world");
        assert!(stack.can_undo());

        assert_eq!(stack.undo().as_deref(), Some("hello"));
        assert!(!stack.can_undo());
        assert!(stack.can_redo());

        assert_eq!(stack.redo().as_deref(), Some("hello world"));
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut stack = UndoStack::new(100);
        step(&mut stack, "abc", "abcd");
        assert!(stack.undo().is_some());
        assert!(stack.can_redo());

        // New edit should clear redo
        step(&mut stack, "abc", "abce");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_max_steps() {
        let mut stack = UndoStack::new(3);
        step(&mut stack, "", "a");
        step(&mut stack, "a", "ab");
        step(&mut stack, "ab", "abc");
        step(&mut stack, "abc", "abcd"); // should evict "a"

        assert_eq!(stack.undo().as_deref(), Some("abc"));
        assert_eq!(stack.undo().as_deref(), Some("ab"));
        assert_eq!(stack.undo().as_deref(), Some("a"));
        assert_eq!(stack.undo(), None);
    }

    #[test]
    fn test_backspace_undo_only_right_after() {
        let mut stack = UndoStack::new(100);
        stack.record(ChangeSource::AutoLink, true, "x".to_string(), "[x]".to_string());
        assert!(stack.is_backspace_armed());
        assert_eq!(stack.last_step().map(|s| s.source), Some(ChangeSource::AutoLink));

        stack.disarm_backspace_undo();
        assert_eq!(stack.undo_by_backspace(), None);

        stack.record(ChangeSource::AutoComplete, true, "[x]".to_string(), "- ".to_string());
        assert_eq!(stack.undo_by_backspace().as_deref(), Some("[x]"));
        // Only once.
        assert_eq!(stack.undo_by_backspace(), None);

        step(&mut stack, "[x]", "[x]y");
        assert!(!stack.is_backspace_armed());
    }

    #[test]
    fn test_backspace_undo_expires() {
        let window = Duration::from_millis(500);
        let mut stack = UndoStack::new(100).with_backspace_window(window);
        stack.record(ChangeSource::AutoLink, true, "x".to_string(), "[x]".to_string());
        let recorded_at = stack.last_step().map(|s| s.recorded_at).unwrap();

        assert_eq!(
            stack.undo_by_backspace_at(recorded_at + window + Duration::from_millis(1)),
            None
        );
        assert!(!stack.is_backspace_armed());
        // Still available through a regular undo.
        assert_eq!(stack.undo().as_deref(), Some("x"));

        stack.record(ChangeSource::AutoLink, true, "x".to_string(), "[x]".to_string());
        let recorded_at = stack.last_step().map(|s| s.recorded_at).unwrap();
        assert_eq!(
            stack.undo_by_backspace_at(recorded_at + window).as_deref(),
            Some("x")
        );
    }
}
