//! Alert dispatch seam
//!
//! Fail-level evaluations must reach production management; how they get
//! there (email, push, ticket) is the surrounding application's concern.
//! The application implements [`AlertSink`] and the evaluation pipeline
//! hands over through [`forward_if_fail`].

use crate::core::identity::EntityId;
use crate::entities::evaluation::Evaluation;

/// Receiver for fail-level evaluations
pub trait AlertSink {
    /// Called once per fail-level evaluation with the record it belongs to
    fn dispatch(&self, record_id: &EntityId, evaluation: &Evaluation);
}

/// Sink that drops every alert; useful in tests and batch re-evaluation
#[derive(Debug, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn dispatch(&self, _record_id: &EntityId, _evaluation: &Evaluation) {}
}

/// Forward the evaluation to the sink iff its overall result is fail.
/// Returns whether an alert was dispatched.
pub fn forward_if_fail<S: AlertSink>(
    sink: &S,
    record_id: &EntityId,
    evaluation: &Evaluation,
) -> bool {
    if evaluation.is_fail() {
        sink.dispatch(record_id, evaluation);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use crate::entities::evaluation::Severity;
    use std::cell::RefCell;

    /// Test sink that records what it was handed
    #[derive(Default)]
    struct RecordingSink {
        dispatched: RefCell<Vec<String>>,
    }

    impl AlertSink for RecordingSink {
        fn dispatch(&self, record_id: &EntityId, _evaluation: &Evaluation) {
            self.dispatched.borrow_mut().push(record_id.to_string());
        }
    }

    #[test]
    fn test_fail_is_forwarded() {
        let sink = RecordingSink::default();
        let id = EntityId::new(EntityPrefix::Smp);
        let eval = Evaluation {
            overall_result: Severity::Fail,
            ..Default::default()
        };

        assert!(forward_if_fail(&sink, &id, &eval));
        assert_eq!(sink.dispatched.borrow().len(), 1);
        assert_eq!(sink.dispatched.borrow()[0], id.to_string());
    }

    #[test]
    fn test_warning_and_pass_are_not_forwarded() {
        let sink = RecordingSink::default();
        let id = EntityId::new(EntityPrefix::Smp);

        for severity in [Severity::Pass, Severity::Warning] {
            let eval = Evaluation {
                overall_result: severity,
                ..Default::default()
            };
            assert!(!forward_if_fail(&sink, &id, &eval));
        }
        assert!(sink.dispatched.borrow().is_empty());
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let id = EntityId::new(EntityPrefix::Smp);
        let eval = Evaluation {
            overall_result: Severity::Fail,
            ..Default::default()
        };
        assert!(forward_if_fail(&NullAlertSink, &id, &eval));
    }
}
