//! Handler factory: construct [`Handler`] objects from parsed [`Operation`]s.

use rf_rules::Operation;

use crate::chop::ChopPlan;
use crate::handler::{Handler, OutputTarget};
use crate::handlers::{
    BleepHandler, ConcatHandler, OverlayHandler, PitchHandler, PreviewHandler,
    RandomChopHandler, StutterHandler,
};

/// Create the handler for the operation at position `index`.
///
/// Parameters are checked before the handler is built.
///
/// # Errors
///
/// [`rf_core::Error::InvalidOperation`] or [`rf_core::Error::EmptyBleepRanges`]
/// from [`Operation::check`].
pub fn create_handler(index: usize, op: &Operation) -> rf_core::Result<Box<dyn Handler>> {
    op.check(index)?;

    let target = || OutputTarget::new(op.output(), op.default_output_name().unwrap_or_default());

    let handler: Box<dyn Handler> = match op {
        Operation::Stutter {
            input,
            start,
            duration,
            repeats,
            ..
        } => Box::new(StutterHandler::new(
            input.clone(),
            *start,
            *duration,
            *repeats,
            target(),
        )),
        Operation::Overlay {
            input,
            overlay,
            start,
            end,
            scale,
            position,
            ..
        } => Box::new(OverlayHandler::new(
            input.clone(),
            overlay.clone(),
            *start,
            *end,
            *scale,
            rf_av::Anchor::parse(position),
            target(),
        )),
        Operation::Pitch {
            input, semitones, ..
        } => Box::new(PitchHandler::new(input.clone(), *semitones, target())),
        Operation::RandomChop {
            input,
            count,
            min_len,
            max_len,
            shuffle,
            ..
        } => Box::new(RandomChopHandler::new(
            input.clone(),
            ChopPlan {
                count: *count,
                min_len: *min_len,
                max_len: *max_len,
                shuffle: *shuffle,
            },
            target(),
        )),
        Operation::Concat { inputs, .. } => {
            Box::new(ConcatHandler::new(inputs.clone(), target()))
        }
        Operation::Bleep { input, ranges, .. } => {
            Box::new(BleepHandler::new(input.clone(), ranges, target())?)
        }
        Operation::Preview { file, looping } => {
            Box::new(PreviewHandler::new(file.clone(), *looping))
        }
    };
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rf_core::Error;
    use serde_json::json;

    fn op(v: serde_json::Value) -> Operation {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn every_kind_has_a_handler() {
        let ops = [
            json!({"type": "stutter", "input": "a.mp4"}),
            json!({"type": "overlay", "input": "a.mp4", "overlay": "b.gif"}),
            json!({"type": "pitch", "input": "a.mp4"}),
            json!({"type": "random_chop", "input": "a.mp4"}),
            json!({"type": "concat", "inputs": ["a.mp4"]}),
            json!({"type": "bleep", "input": "a.mp4", "ranges": [{"start": 1}]}),
            json!({"type": "preview", "file": "a.mp4"}),
        ];
        for (i, v) in ops.into_iter().enumerate() {
            let op = op(v);
            let handler = create_handler(i, &op).unwrap();
            assert_eq!(handler.name(), op.kind());
        }
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let err = create_handler(3, &op(json!({"type": "stutter", "input": "a.mp4", "repeats": 0})))
            .err()
            .unwrap();
        assert_matches!(err, Error::InvalidOperation { index: 3, .. });
    }

    #[test]
    fn empty_bleep_is_rejected() {
        let err = create_handler(0, &op(json!({"type": "bleep", "input": "a.mp4"})))
            .err()
            .unwrap();
        assert_matches!(err, Error::EmptyBleepRanges);
        assert_eq!(err.exit_code(), 6);
    }
}
