use std::future::Future;

use crate::error::AppResult;
use crate::models::{DrawMode, PickResult};

/// One step of a sequenced multi-draw batch.
#[derive(Debug, Clone)]
pub struct DrawStep {
    pub item_id: i64,
    pub mode: DrawMode,
    pub target_draw_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step_index: usize,
    pub result: PickResult,
}

#[derive(Debug, Clone)]
pub struct MultiDrawOutcome {
    pub steps: Vec<StepOutcome>,
    /// Index of the step that halted the batch, if any. Steps before it remain
    /// applied; there is no rollback.
    pub failed_index: Option<usize>,
}

impl MultiDrawOutcome {
    pub fn succeeded(&self) -> bool {
        self.failed_index.is_none()
    }
}

/// Execute the steps strictly in order, one awaited pick at a time; each
/// step's result can change eligibility for the next (cross-item exclusion).
/// The batch halts at the first failure, reporting its index; completed steps
/// stay applied because each pick was individually atomic.
pub async fn run_steps<F, Fut>(steps: &[DrawStep], mut pick: F) -> MultiDrawOutcome
where
    F: FnMut(usize, DrawStep) -> Fut,
    Fut: Future<Output = AppResult<PickResult>>,
{
    let mut outcomes = Vec::with_capacity(steps.len());
    let mut failed_index = None;

    for (index, step) in steps.iter().enumerate() {
        let result = match pick(index, step.clone()).await {
            Ok(result) => result,
            Err(e) => PickResult::failure(e.to_string()),
        };
        let ok = result.ok;
        outcomes.push(StepOutcome {
            step_index: index,
            result,
        });
        if !ok {
            failed_index = Some(index);
            break;
        }
    }

    MultiDrawOutcome {
        steps: outcomes,
        failed_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn step(item_id: i64) -> DrawStep {
        DrawStep {
            item_id,
            mode: DrawMode::Random,
            target_draw_number: None,
        }
    }

    fn ok_result(student: &str) -> PickResult {
        PickResult {
            ok: true,
            message: "winner recorded".to_string(),
            winner_student_id: Some(student.to_string()),
            remaining_after: Some(0),
            forced: false,
        }
    }

    #[tokio::test]
    async fn runs_all_steps_in_order() {
        let steps = vec![step(1), step(2), step(3)];
        let outcome = run_steps(&steps, |index, step| async move {
            assert_eq!(step.item_id, (index + 1) as i64);
            Ok(ok_result(&format!("s{}", step.item_id)))
        })
        .await;

        assert!(outcome.succeeded());
        assert_eq!(outcome.steps.len(), 3);
        let order: Vec<usize> = outcome.steps.iter().map(|s| s.step_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn halts_at_first_rejected_step() {
        let steps = vec![step(1), step(2), step(3)];
        let outcome = run_steps(&steps, |index, _step| async move {
            if index == 1 {
                Ok(PickResult::failure("winner quota exhausted"))
            } else {
                Ok(ok_result("s1"))
            }
        })
        .await;

        assert_eq!(outcome.failed_index, Some(1));
        // the third step was never attempted, the first stays applied
        assert_eq!(outcome.steps.len(), 2);
        assert!(outcome.steps[0].result.ok);
        assert!(!outcome.steps[1].result.ok);
    }

    #[tokio::test]
    async fn transport_error_halts_with_failure_result() {
        let steps = vec![step(1), step(2)];
        let outcome = run_steps(&steps, |index, _step| async move {
            if index == 0 {
                Err(AppError::InternalError("connection reset".to_string()))
            } else {
                Ok(ok_result("s2"))
            }
        })
        .await;

        assert_eq!(outcome.failed_index, Some(0));
        assert_eq!(outcome.steps.len(), 1);
        assert!(!outcome.steps[0].result.ok);
        assert!(outcome.steps[0].result.message.contains("connection reset"));
    }
}
