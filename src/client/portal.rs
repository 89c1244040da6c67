//! Portal riddle gate.
//!
//! A full-screen overlay that asks one riddle. The correct answer sets the
//! portal flag and sends the visitor to the signup page; skipping only closes
//! the overlay.

use std::time::Duration;

use super::puzzle::PuzzleContext;
use super::storage::ClientStorage;

pub const RIDDLE: &str = "I have no voice, yet I answer every call. \
     I live in empty halls and give your words back to you. What am I?";

const ANSWER: &str = "echo";

/// Route on which a returning solver skips the overlay.
pub const HOME_ROUTE: &str = "/";
/// Where a fresh solver is sent.
pub const SIGNUP_ROUTE: &str = "/signup";
/// How long the success message stays up before redirecting.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalOutcome {
    /// Correct; navigate to `redirect` after `after`.
    Solved {
        redirect: &'static str,
        after: Duration,
    },
    Incorrect,
    /// The overlay was already dismissed.
    Closed,
}

/// Case-insensitive match against the riddle's answer, ignoring surrounding whitespace.
pub fn is_correct_answer(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(ANSWER)
}

/// Overlay state for one page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    open: bool,
}

impl Portal {
    /// Show the overlay, unless this is the home route and the portal is already solved.
    pub fn mount<S: ClientStorage>(context: &PuzzleContext<S>, route: &str) -> Self {
        Self {
            open: !(route == HOME_ROUTE && context.portal_solved()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn submit_answer<S: ClientStorage>(
        &mut self,
        context: &mut PuzzleContext<S>,
        answer: &str,
    ) -> PortalOutcome {
        if !self.open {
            return PortalOutcome::Closed;
        }
        if !is_correct_answer(answer) {
            return PortalOutcome::Incorrect;
        }

        context.set_portal_solved(true);
        self.open = false;
        PortalOutcome::Solved {
            redirect: SIGNUP_ROUTE,
            after: REDIRECT_DELAY,
        }
    }

    /// Enter without answering. Grants nothing.
    pub fn skip(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;

    fn fresh() -> PuzzleContext<MemoryStorage> {
        PuzzleContext::load(MemoryStorage::new())
    }

    #[test]
    fn test_answer_matching() {
        assert!(is_correct_answer("echo"));
        assert!(is_correct_answer("ECHO"));
        assert!(is_correct_answer("  Echo \n"));
        assert!(!is_correct_answer("echoes"));
        assert!(!is_correct_answer("an echo"));
        assert!(!is_correct_answer(""));
    }

    #[test]
    fn test_correct_answer_solves_and_redirects() {
        let mut ctx = fresh();
        let mut portal = Portal::mount(&ctx, HOME_ROUTE);
        assert!(portal.is_open());

        assert_eq!(
            portal.submit_answer(&mut ctx, "Echo"),
            PortalOutcome::Solved {
                redirect: SIGNUP_ROUTE,
                after: REDIRECT_DELAY,
            }
        );
        assert!(!portal.is_open());
        assert!(ctx.portal_solved());
        assert!(ctx.is_level_unlocked("echoes"));
    }

    #[test]
    fn test_wrong_answer_keeps_overlay() {
        let mut ctx = fresh();
        let mut portal = Portal::mount(&ctx, HOME_ROUTE);

        assert_eq!(
            portal.submit_answer(&mut ctx, "silence"),
            PortalOutcome::Incorrect
        );
        assert!(portal.is_open());
        assert!(!ctx.portal_solved());
    }

    #[test]
    fn test_skip_grants_nothing() {
        let mut ctx = fresh();
        let mut portal = Portal::mount(&ctx, HOME_ROUTE);
        portal.skip();

        assert!(!portal.is_open());
        assert!(!ctx.portal_solved());
        assert_eq!(portal.submit_answer(&mut ctx, "echo"), PortalOutcome::Closed);
        assert!(!ctx.portal_solved());
    }

    #[test]
    fn test_returning_solver_skips_overlay_on_home() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);

        assert!(!Portal::mount(&ctx, HOME_ROUTE).is_open());
        assert!(Portal::mount(&ctx, "/events").is_open());
    }
}
