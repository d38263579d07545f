//! Concurrency building blocks (§5): a chunked parallel-for with persistent
//! per-thread scratch, a two-stage reader/merge pipeline, and latched
//! fatal-error propagation.

use crate::error::{Error, Result};
use std::sync::mpsc::sync_channel;
use std::sync::Mutex;
use std::thread;

/// Split `[0, n)` into `n_threads` roughly equal chunks and run `f` once per
/// chunk inside a `rayon::scope`, handing each worker a fresh `S` (built by
/// `make_scratch`) that survives for the whole chunk rather than being
/// recreated per item.
pub fn parallel_for<S, F>(n: usize, n_threads: usize, make_scratch: impl Fn() -> S + Sync, f: F)
where
    S: Send,
    F: Fn(&mut S, usize) + Sync,
{
    if n == 0 {
        return;
    }
    let n_threads = n_threads.max(1).min(n);
    let chunk = (n + n_threads - 1) / n_threads;
    rayon::scope(|scope| {
        for t in 0..n_threads {
            let start = t * chunk;
            let end = (start + chunk).min(n);
            if start >= end {
                continue;
            }
            let f = &f;
            let make_scratch = &make_scratch;
            scope.spawn(move |_| {
                let mut scratch = make_scratch();
                for i in start..end {
                    f(&mut scratch, i);
                }
            });
        }
    });
}

/// A latch that records the first fatal error raised by any worker; pipeline
/// drivers check it at every join point and abort once set.
#[derive(Default)]
pub struct ErrorLatch(Mutex<Option<Error>>);

impl ErrorLatch {
    pub fn new() -> Self {
        ErrorLatch(Mutex::new(None))
    }

    pub fn set(&self, err: Error) {
        let mut slot = self.0.lock().unwrap();
        if slot.is_none() {
            tracing::warn!(%err, "latching first fatal error");
            *slot = Some(err);
        }
    }

    pub fn take(&self) -> Option<Error> {
        self.0.lock().unwrap().take()
    }
}

/// Run a two-stage producer/consumer pipeline: `stage_s` reads/transforms
/// items of type `In` into `Mid` on its own thread; `stage_m` consumes
/// `Mid` into `Out` on another. The two are connected by bounded
/// single-slot mailboxes so stage M is never more than one batch behind
/// stage S, matching the "coroutine-like" two-thread design.
pub fn two_stage_pipeline<In, Mid, Out>(
    inputs: Vec<In>,
    stage_s: impl Fn(In) -> Result<Mid> + Send + 'static,
    stage_m: impl Fn(Mid) -> Result<Out> + Send + 'static,
) -> Result<Vec<Out>>
where
    In: Send + 'static,
    Mid: Send + 'static,
    Out: Send + 'static,
{
    tracing::debug!(n_inputs = inputs.len(), "starting two-stage pipeline");
    let (req_tx, req_rx) = sync_channel::<In>(1);
    let (resp_tx, resp_rx) = sync_channel::<Result<Mid>>(1);

    let reader = thread::spawn(move || {
        while let Ok(item) = req_rx.recv() {
            let result = stage_s(item);
            let stop = result.is_err();
            if resp_tx.send(result).is_err() || stop {
                break;
            }
        }
    });

    let merger = thread::spawn(move || -> Result<Vec<Out>> {
        let mut out = Vec::new();
        while let Ok(mid) = resp_rx.recv() {
            out.push(stage_m(mid?)?);
        }
        Ok(out)
    });

    for item in inputs {
        if req_tx.send(item).is_err() {
            break;
        }
    }
    drop(req_tx);

    reader.join().expect("reader thread panicked");
    merger.join().expect("merger thread panicked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn parallel_for_visits_every_index_exactly_once() {
        let n = 37;
        let seen: Vec<AtomicUsize> = (0..n).map(|_| AtomicUsize::new(0)).collect();
        let seen = Arc::new(seen);
        let seen2 = seen.clone();
        parallel_for(n, 4, || (), move |_scratch, i| {
            seen2[i].fetch_add(1, Ordering::SeqCst);
        });
        for s in seen.iter() {
            assert_eq!(s.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn two_stage_pipeline_doubles_then_stringifies_in_order() {
        let inputs: Vec<i32> = (0..10).collect();
        let out = two_stage_pipeline(
            inputs,
            |x| Ok(x * 2),
            |x| Ok(format!("{}", x)),
        )
        .unwrap();
        let want: Vec<String> = (0..10).map(|x| format!("{}", x * 2)).collect();
        assert_eq!(out, want);
    }

    #[test]
    fn error_latch_keeps_first_error() {
        let latch = ErrorLatch::new();
        latch.set(Error::AllocFailed { what: "first" });
        latch.set(Error::AllocFailed { what: "second" });
        match latch.take() {
            Some(Error::AllocFailed { what }) => assert_eq!(what, "first"),
            _ => panic!("expected AllocFailed"),
        }
    }
}
