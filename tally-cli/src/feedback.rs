use tally_lib::feedback::{Feedback, FeedbackStyle, NotificationKind};
use tracing::trace;

/// A terminal can't buzz, so feedback only shows up in the trace log.
#[derive(Debug, Clone, Copy)]
pub struct TracingFeedback;

impl Feedback for TracingFeedback {
    fn impact(&self, style: FeedbackStyle) {
        trace!("impact feedback: {style:?}");
    }

    fn notification(&self, kind: NotificationKind) {
        trace!("notification feedback: {kind:?}");
    }

    fn selection(&self) {
        trace!("selection feedback");
    }
}
