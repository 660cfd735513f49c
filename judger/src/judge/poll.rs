use crate::provider::{
    JudgeError, JudgeResult, Poll, PollPolicy, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
};
use std::{future::Future, time::Duration};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollSettings {
    /// Timing requested by a backend, or the defaults if it has no opinion.
    pub fn from_policy(policy: Option<&dyn PollPolicy>) -> PollSettings {
        match policy {
            Some(p) => PollSettings {
                interval: p.poll_interval(),
                timeout: p.poll_timeout(),
            },
            None => PollSettings::default(),
        }
    }
}

/// Call `check` until it reports [`Poll::Done`] or `settings.timeout` elapses.
///
/// The first check happens right away, later ones `settings.interval` apart.
/// The deadline is fixed on entry and sleeps never run past it; a check is
/// still made at the deadline before giving up with [`JudgeError::Timeout`].
/// An error from `check` is returned as-is without further attempts.
pub async fn poll_until<T, F, Fut>(settings: PollSettings, mut check: F) -> JudgeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = JudgeResult<Poll<T>>>,
{
    // a timeout too large to add never expires
    let deadline = Instant::now().checked_add(settings.timeout);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        tracing::debug!(attempt, "Checking for result");
        if let Poll::Done(res) = check().await? {
            tracing::debug!(attempt, "Result is ready");
            return Ok(res);
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::info!(
                        "Gave up after {} checks ({:?})",
                        attempt,
                        settings.timeout
                    );
                    return Err(JudgeError::Timeout(settings.timeout));
                }
                settings.interval.min(deadline - now)
            }
            None => settings.interval,
        };
        tokio::time::sleep(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SETTINGS: PollSettings = PollSettings {
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(5),
    };

    #[tokio::test(start_paused = true)]
    async fn done_on_third_check() {
        let start = Instant::now();
        let mut calls = 0;
        let res = poll_until(SETTINGS, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Ok(Poll::Pending)
                } else {
                    Ok(Poll::Done("X"))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(res, "X");
        assert_eq!(calls, 3);
        // two sleeps, not three
        assert!(start.elapsed() < Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_at_deadline_not_before() {
        let start = Instant::now();
        let mut calls = 0;
        let err = poll_until::<(), _, _>(SETTINGS, || {
            calls += 1;
            async { Ok(Poll::Pending) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, JudgeError::Timeout(d) if d == SETTINGS.timeout));
        assert!(err.is_retryable());
        assert!(start.elapsed() >= SETTINGS.timeout);
        assert!(start.elapsed() < SETTINGS.timeout + Duration::from_millis(500));
        assert_eq!(calls, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_keeps_polling() {
        let settings = PollSettings {
            interval: Duration::from_secs(1),
            timeout: Duration::MAX,
        };
        let mut calls = 0;
        let res = poll_until(settings, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 4 {
                    Ok(Poll::Pending)
                } else {
                    Ok(Poll::Done(n))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(res, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn error_stops_polling() {
        let mut calls = 0;
        let err = poll_until::<(), _, _>(SETTINGS, || {
            calls += 1;
            let n = calls;
            async move {
                if n == 2 {
                    Err(JudgeError::NotFound("handle".into()))
                } else {
                    Ok(Poll::Pending)
                }
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, JudgeError::NotFound(_)));
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_are_clamped_to_deadline() {
        let settings = PollSettings {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(3),
        };
        let start = Instant::now();
        let mut calls = 0;
        let err = poll_until::<(), _, _>(settings, || {
            calls += 1;
            async { Ok(Poll::Pending) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, JudgeError::Timeout(_)));
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
        assert_eq!(calls, 2);
    }

    struct Slow;

    impl PollPolicy for Slow {
        fn poll_interval(&self) -> Duration {
            Duration::from_millis(250)
        }

        fn poll_timeout(&self) -> Duration {
            Duration::from_secs(90)
        }
    }

    #[test]
    fn settings_from_policy() {
        assert_eq!(PollSettings::from_policy(None), PollSettings::default());
        assert_eq!(
            PollSettings::from_policy(Some(&Slow)),
            PollSettings {
                interval: Duration::from_millis(250),
                timeout: Duration::from_secs(90),
            }
        );
    }
}
