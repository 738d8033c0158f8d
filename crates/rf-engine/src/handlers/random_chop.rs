//! Randomized chop-and-reassemble.

use std::path::{Path, PathBuf};

use rf_av::TransformRequest;

use crate::chop::{ChopPlan, FALLBACK_DURATION};
use crate::context::EngineContext;
use crate::handler::{Handler, HandlerOutcome, OutputTarget};

const LIST: &str = "rand_list.txt";

fn fragment_name(i: usize) -> String {
    format!("rand_frag_{i}.mp4")
}

#[derive(Debug)]
pub struct RandomChopHandler {
    input: PathBuf,
    plan: ChopPlan,
    output: OutputTarget,
}

impl RandomChopHandler {
    pub fn new(input: PathBuf, plan: ChopPlan, output: OutputTarget) -> Self {
        Self {
            input,
            plan,
            output,
        }
    }

    /// Probed duration of `input`, or [`FALLBACK_DURATION`] when probing is
    /// skipped, fails, or reports nothing positive.
    fn source_duration(&self, ctx: &EngineContext, input: &Path) -> f64 {
        let probed = if ctx.dry_run {
            None
        } else {
            match ctx.transcoder.probe(input) {
                Ok(meta) => meta.positive_duration(),
                Err(e) => {
                    tracing::debug!(input = %input.display(), "Probe failed: {e}");
                    None
                }
            }
        };
        probed.unwrap_or_else(|| {
            tracing::warn!(
                input = %input.display(),
                "Unable to probe duration; assuming {FALLBACK_DURATION}s"
            );
            FALLBACK_DURATION
        })
    }
}

impl Handler for RandomChopHandler {
    fn name(&self) -> &'static str {
        "random_chop"
    }

    fn execute(&self, ctx: &EngineContext) -> rf_core::Result<HandlerOutcome> {
        let input = ctx.input(&self.input);
        let output = self.output.resolve(ctx);
        let duration = self.source_duration(ctx, &input);
        let segments = ctx.with_rng(|rng| self.plan.segments(duration, rng));

        let mut fragments = Vec::with_capacity(segments.len());
        for (i, seg) in segments.iter().enumerate() {
            let fragment = ctx.work_file(&fragment_name(i));
            ctx.transform(TransformRequest::RandomFragment {
                input: input.clone(),
                start: seg.start,
                duration: seg.length,
                output: fragment.clone(),
            })?;
            fragments.push(fragment);
        }

        let list = ctx.write_list(LIST, &fragments)?;
        ctx.transform(TransformRequest::ConcatFromList {
            list,
            output: output.clone(),
        })?;

        Ok(HandlerOutcome {
            summary: format!(
                "Reassembled {} random segments of a {:.2}s source",
                segments.len(),
                duration
            ),
            output: Some(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::context;
    use rf_av::fake::{video_metadata, RecordingTranscoder};
    use std::sync::Arc;

    fn handler(count: u32) -> RandomChopHandler {
        RandomChopHandler::new(
            "clip.mp4".into(),
            ChopPlan {
                count,
                min_len: 0.1,
                max_len: 0.4,
                shuffle: true,
            },
            OutputTarget::new(None, "rand_out.mp4"),
        )
    }

    #[test]
    fn segments_fit_probed_duration() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(
            RecordingTranscoder::new().with_metadata("clip.mp4", video_metadata(2.0, 640, 360, 25.0)),
        );
        let ctx = context(&fake, dir.path());

        handler(5).execute(&ctx).unwrap();

        assert_eq!(fake.probe_count(), 1);
        let reqs = fake.requests();
        assert_eq!(reqs.len(), 6);
        for (i, req) in reqs[..5].iter().enumerate() {
            match req {
                TransformRequest::RandomFragment {
                    start,
                    duration,
                    output,
                    ..
                } => {
                    assert!(*start >= 0.0 && start + duration <= 2.0 + 1e-9);
                    assert!((0.1..=0.4).contains(duration));
                    assert_eq!(*output, dir.path().join(fragment_name(i)));
                }
                other => panic!("unexpected request {other:?}"),
            }
        }
        assert_eq!(reqs[5].kind(), "concat-from-list");
        let list = std::fs::read_to_string(dir.path().join(LIST)).unwrap();
        assert_eq!(list.lines().count(), 5);
    }

    #[test]
    fn unprobeable_input_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(RecordingTranscoder::new());
        let ctx = context(&fake, dir.path());
        let h = handler(2);
        assert_eq!(h.source_duration(&ctx, Path::new("clip.mp4")), FALLBACK_DURATION);
        h.execute(&ctx).unwrap();
        assert_eq!(fake.transform_count(), 3);
    }

    #[test]
    fn dry_run_does_not_probe() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(RecordingTranscoder::new());
        let ctx = context(&fake, dir.path()).with_dry_run(true);
        handler(4).execute(&ctx).unwrap();
        assert_eq!(fake.call_count(), 0);
        assert!(!dir.path().join(LIST).exists());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = || {
            let dir = tempfile::tempdir().unwrap();
            let fake = Arc::new(
                RecordingTranscoder::new()
                    .with_metadata("clip.mp4", video_metadata(9.0, 640, 360, 25.0)),
            );
            handler(6).execute(&context(&fake, dir.path())).unwrap();
            fake.requests()
                .into_iter()
                .filter_map(|r| match r {
                    TransformRequest::RandomFragment { start, duration, .. } => {
                        Some((start, duration))
                    }
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
