#[cfg(feature = "trace")]
use std::fmt::Display;
#[cfg(feature = "trace")]
use std::fs::File;
use std::io::Write;

use crate::api::SaoGroup;
use crate::com::sao::*;

pub(crate) type Tracer = (Box<dyn Write + Send>, isize);

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(feature = "trace")]
pub(crate) fn OPEN_TRACE() -> Option<Tracer> {
    if let Ok(fp) = File::create("sao_trace.txt") {
        Some((Box::new(fp), 0))
    } else {
        None
    }
}

#[cfg(feature = "trace")]
pub(crate) fn EVC_TRACE_COUNTER(tracer: &mut Option<Tracer>) {
    if let Some((writer, counter)) = tracer {
        let _ = writer.write_fmt(format_args!("{} \t", *counter));
        *counter += 1;
    }
}

#[cfg(feature = "trace")]
pub(crate) fn EVC_TRACE_COUNTER_RESET(tracer: &mut Option<Tracer>) {
    if let Some((_, counter)) = tracer {
        *counter = 0;
    }
}

#[cfg(feature = "trace")]
pub(crate) fn EVC_TRACE<T: Display>(tracer: &mut Option<Tracer>, name: T) {
    if let Some((writer, _)) = tracer {
        let _ = writer.write_fmt(format_args!("{}", name));
    }
}

#[cfg(feature = "trace")]
pub(crate) fn TRACE_SAO(
    tracer: &mut Option<Tracer>,
    cx: usize,
    cy: usize,
    group: SaoGroup,
    params: &SaoParams,
) {
    EVC_TRACE_COUNTER(tracer);
    EVC_TRACE(tracer, "sao ctu ");
    EVC_TRACE(tracer, cx);
    EVC_TRACE(tracer, " ");
    EVC_TRACE(tracer, cy);
    EVC_TRACE(tracer, " ");
    EVC_TRACE(tracer, group);
    EVC_TRACE(tracer, " kind ");
    EVC_TRACE(tracer, params.kind());
    EVC_TRACE(tracer, " merge ");
    EVC_TRACE(tracer, format!("{:?}", params.merge));
    match params.mode {
        SaoMode::Edge { class, .. } => {
            EVC_TRACE(tracer, " class ");
            EVC_TRACE(tracer, class);
        }
        SaoMode::Band { position, .. } => {
            EVC_TRACE(tracer, " pos ");
            EVC_TRACE(tracer, format!("{:?}", position));
        }
        SaoMode::None => {}
    }
    EVC_TRACE(tracer, " offsets ");
    EVC_TRACE(tracer, format!("{:?}", params.offsets()));
    EVC_TRACE(tracer, " dist ");
    EVC_TRACE(tracer, params.distortion);
    EVC_TRACE(tracer, " \n");
}

#[cfg(not(feature = "trace"))]
pub(crate) fn OPEN_TRACE() -> Option<Tracer> {
    None
}

#[cfg(not(feature = "trace"))]
pub(crate) fn EVC_TRACE_COUNTER_RESET(_tracer: &mut Option<Tracer>) {}

#[cfg(not(feature = "trace"))]
pub(crate) fn TRACE_SAO(
    _tracer: &mut Option<Tracer>,
    _cx: usize,
    _cy: usize,
    _group: SaoGroup,
    _params: &SaoParams,
) {
}
