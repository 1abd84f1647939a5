//! Tactile and audible acknowledgement of user actions.
//!
//! Front ends inject whatever their platform offers. The data core never calls this itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStyle {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

pub trait Feedback {
    fn impact(&self, style: FeedbackStyle);

    fn notification(&self, kind: NotificationKind);

    fn selection(&self);

    /// The impact that acknowledges a job being marked paid or unpaid.
    fn paid_changed(&self, paid: bool) {
        self.impact(if paid {
            FeedbackStyle::Medium
        } else {
            FeedbackStyle::Light
        });
    }
}

/// Feedback for front ends without any.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Feedback for Silent {
    fn impact(&self, _style: FeedbackStyle) {}

    fn notification(&self, _kind: NotificationKind) {}

    fn selection(&self) {}
}
