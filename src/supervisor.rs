//! Outer failure boundary: restart the wrapped run after every failure.

use crate::errors::Result;
use crate::utils::pause;
use std::time::Duration;
use tracing::{error, info};

/// Normal, non-error end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The repetition cap was reached.
    Done,
}

/// A run the supervisor can start over from scratch.
#[allow(async_fn_in_trait)]
pub trait Restartable {
    async fn run_once(&mut self) -> Result<RunExit>;
}

/// Run `task` until it exits normally. Failures are logged and the task is
/// restarted after `cooldown`, with no retry limit.
pub async fn supervise<T: Restartable>(task: &mut T, cooldown: Duration) -> RunExit {
    let mut restarts: u64 = 0;
    loop {
        match task.run_once().await {
            Ok(exit) => {
                info!(restarts, "[SUPERVISOR] run finished");
                return exit;
            }
            Err(e) => {
                restarts += 1;
                error!(error = %e, restarts, "[SUPERVISOR] error occurred, restarting process");
                error!("=========================================================================");
                error!("=                  -->>>>>>CHECK WALLET BALANCES<<<<<---                =");
                error!("=========================================================================");
                pause(cooldown).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use tokio::time::Instant;

    struct AlwaysFailing {
        attempts: u32,
        give_up_after: u32,
        started: Vec<Instant>,
    }

    impl Restartable for AlwaysFailing {
        async fn run_once(&mut self) -> Result<RunExit> {
            self.attempts += 1;
            self.started.push(Instant::now());
            if self.attempts >= self.give_up_after {
                // stands in for the operator killing the process
                return Ok(RunExit::Done);
            }
            Err(AppError::Broadcast("insufficient funds".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restarts_with_cooldown_until_exit() {
        let mut task = AlwaysFailing {
            attempts: 0,
            give_up_after: 50,
            started: Vec::new(),
        };
        let exit = supervise(&mut task, Duration::from_millis(1000)).await;
        assert_eq!(exit, RunExit::Done);
        assert_eq!(task.attempts, 50);
        for gap in task.started.windows(2) {
            assert_eq!(gap[1] - gap[0], Duration::from_millis(1000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminates_on_persistent_failure() {
        let mut task = AlwaysFailing {
            attempts: 0,
            give_up_after: u32::MAX,
            started: Vec::new(),
        };
        let outcome = tokio::time::timeout(
            Duration::from_secs(60),
            supervise(&mut task, Duration::from_millis(1000)),
        )
        .await;
        assert!(outcome.is_err(), "supervisor gave up");
        assert!(task.attempts >= 60);
    }
}
