//! The three export strategies, each turning a quantized timeline into encoder steps.
//!
//! All three obey the same positional model: a transition of `T` frames occupies the last `T`
//! frames of the outgoing clip's slot, so every strategy emits `Σ clip frames` in total.

use crate::{
    export::plan::{
        PlanContext, PlanFile, Step, StepOutput, global_args, intermediate_args, path_arg, strings,
    },
    timing::quantize::frames_to_secs_arg,
};

const CONCAT_LIST: &str = "inputs.ffconcat";

/// Strategy A: one encode over an ordered `(image, duration)` list, capped at the exact total.
pub(crate) fn concat(ctx: &PlanContext<'_>) -> (Vec<PlanFile>, Vec<Step>) {
    let list_path = ctx.dir.join(CONCAT_LIST);
    let list = concat_list(ctx);

    let mut vf = ctx.fit_chain();
    if let Some(palette) = ctx.palette_chain(",", "") {
        vf.push_str(&palette);
    }

    let mut args = global_args();
    args.extend(strings(&[
        "-f",
        "concat",
        "-safe",
        "0",
        "-i",
        &path_arg(&list_path),
        "-vf",
        &vf,
        "-frames:v",
        &ctx.timeline.total_frames().to_string(),
    ]));
    args.extend(ctx.delivery_args());

    let files = vec![PlanFile {
        path: list_path,
        contents: list.into_bytes().into(),
    }];
    let step = Step {
        label: "encode concatenated clips".to_string(),
        args,
        output: StepOutput::Stdout,
        discard_after: Vec::new(),
    };
    (files, vec![step])
}

/// `ffconcat` list with per-entry durations taken from the quantized frame counts.
pub(crate) fn concat_list(ctx: &PlanContext<'_>) -> String {
    let mut out = String::from("ffconcat version 1.0\n");
    for (clip, image) in ctx.timeline.clips.iter().zip(ctx.images) {
        out.push_str(&format!("file {}\n", quote_concat_path(&path_arg(image))));
        out.push_str(&format!(
            "duration {}\n",
            frames_to_secs_arg(clip.frames, ctx.fps)
        ));
    }
    // The demuxer drops the last entry's duration unless the file is repeated.
    if let Some(last) = ctx.images.last() {
        out.push_str(&format!("file {}\n", quote_concat_path(&path_arg(last))));
    }
    out
}

fn quote_concat_path(p: &str) -> String {
    format!("'{}'", p.replace('\'', r"'\''"))
}

/// Strategy B: every clip is a looped input lengthened by its predecessor's transition; blends
/// are placed at absolute offsets on the output timeline and the total emerges from the chain.
pub(crate) fn xfade(ctx: &PlanContext<'_>) -> (Vec<PlanFile>, Vec<Step>) {
    let clips = &ctx.timeline.clips;
    let fit = ctx.fit_chain();
    let mut args = global_args();
    let mut graph = Vec::with_capacity(clips.len() * 2);

    for (i, (clip, image)) in clips.iter().zip(ctx.images).enumerate() {
        let inherited = if i == 0 {
            0
        } else {
            clips[i - 1].transition_frames
        };
        let input_frames = clip.frames + inherited;
        args.extend(ctx.looped_input(image, input_frames));
        graph.push(format!(
            "[{i}:v]{fit},trim=end_frame={input_frames},setpts=PTS-STARTPTS[s{i}]"
        ));
    }

    let mut prev = "s0".to_string();
    for i in 1..clips.len() {
        let out = format!("v{i}");
        let incoming = &clips[i - 1];
        match incoming.transition.and_then(|k| k.xfade_name()) {
            Some(name) if incoming.transition_frames > 0 => {
                let t = incoming.transition_frames;
                // Absolute: original (unextended) start of clip `i` minus the blend length.
                let offset = clips[i].start.0 - t;
                graph.push(format!(
                    "[{prev}][s{i}]xfade=transition={name}:duration={}:offset={}[{out}]",
                    frames_to_secs_arg(t, ctx.fps),
                    frames_to_secs_arg(offset, ctx.fps),
                ));
            }
            _ => graph.push(format!("[{prev}][s{i}]concat=n=2:v=1:a=0[{out}]")),
        }
        prev = out;
    }

    let mut map = format!("[{prev}]");
    if let Some(palette) = ctx.palette_chain(&map, "[gif]") {
        graph.push(palette);
        map = "[gif]".to_string();
    }

    args.extend(strings(&["-filter_complex", &graph.join(";"), "-map", &map]));
    args.extend(ctx.delivery_args());

    let step = Step {
        label: "encode cross-fade chain".to_string(),
        args,
        output: StepOutput::Stdout,
        discard_after: Vec::new(),
    };
    (Vec::new(), vec![step])
}

/// Strategy C: pre-encode one segment per clip, fold pairwise with local blends, then encode the
/// accumulator for delivery.
pub(crate) fn segmented(ctx: &PlanContext<'_>) -> (Vec<PlanFile>, Vec<Step>) {
    let clips = &ctx.timeline.clips;
    let fit = ctx.fit_chain();
    let mut steps = Vec::with_capacity(clips.len() * 2);

    let mut segments = Vec::with_capacity(clips.len());
    for (i, (clip, image)) in clips.iter().zip(ctx.images).enumerate() {
        // A short clip still has to supply the head of the blend coming into it.
        let inherited = if i == 0 {
            0
        } else {
            clips[i - 1].transition_frames
        };
        let frames = clip.frames.max(inherited);
        let seg = ctx.dir.join(format!("seg_{i:03}.mkv"));

        let mut args = global_args();
        args.extend(ctx.looped_input(image, frames));
        args.extend(strings(&["-vf", &fit, "-frames:v", &frames.to_string()]));
        args.extend(intermediate_args(&seg));
        steps.push(Step {
            label: format!("encode segment {}/{}", i + 1, clips.len()),
            args,
            output: StepOutput::File(seg.clone()),
            discard_after: Vec::new(),
        });
        segments.push(seg);
    }

    let mut acc = segments[0].clone();
    let mut acc_frames = clips[0].frames;
    for i in 1..clips.len() {
        let outgoing = &clips[i - 1];
        let incoming_frames = clips[i].frames;
        let graph = match outgoing.transition.and_then(|k| k.xfade_name()) {
            Some(name) if outgoing.transition_frames > 0 => {
                let t = outgoing.transition_frames;
                let main = acc_frames - t;
                let dur = frames_to_secs_arg(t, ctx.fps);
                [
                    "[0:v]split=2[a0][a1]".to_string(),
                    format!("[a0]trim=end_frame={main},setpts=PTS-STARTPTS[main]"),
                    format!("[a1]trim=start_frame={main},setpts=PTS-STARTPTS[tail]"),
                    "[1:v]split=2[b0][b1]".to_string(),
                    format!("[b0]trim=end_frame={t},setpts=PTS-STARTPTS[head]"),
                    format!("[b1]trim=end_frame={incoming_frames},setpts=PTS-STARTPTS[full]"),
                    // Local offset: the blend starts at the first frame of `tail`.
                    format!("[tail][head]xfade=transition={name}:duration={dur}:offset=0[blend]"),
                    "[main][blend][full]concat=n=3:v=1:a=0[out]".to_string(),
                ]
                .join(";")
            }
            _ => [
                "[0:v]setpts=PTS-STARTPTS[a]".to_string(),
                format!("[1:v]trim=end_frame={incoming_frames},setpts=PTS-STARTPTS[b]"),
                "[a][b]concat=n=2:v=1:a=0[out]".to_string(),
            ]
            .join(";"),
        };

        let next = ctx.dir.join(format!("acc_{i:03}.mkv"));
        let mut args = global_args();
        args.extend(strings(&[
            "-i",
            &path_arg(&acc),
            "-i",
            &path_arg(&segments[i]),
            "-filter_complex",
            &graph,
            "-map",
            "[out]",
        ]));
        args.extend(intermediate_args(&next));
        steps.push(Step {
            label: format!("fold clip {}/{}", i + 1, clips.len()),
            args,
            output: StepOutput::File(next.clone()),
            discard_after: vec![acc, segments[i].clone()],
        });
        acc = next;
        acc_frames += incoming_frames;
    }

    let mut args = global_args();
    args.extend(strings(&["-i", &path_arg(&acc)]));
    if let Some(palette) = ctx.palette_chain("", "") {
        args.extend(strings(&["-vf", &palette]));
    }
    args.extend(strings(&["-frames:v", &acc_frames.to_string()]));
    args.extend(ctx.delivery_args());
    steps.push(Step {
        label: "encode delivery".to_string(),
        args,
        output: StepOutput::Stdout,
        discard_after: vec![acc],
    });

    (Vec::new(), steps)
}
