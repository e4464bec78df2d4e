//! Render server for the Newton fractal explorer.
//!
//! Runs are concurrent down to the row level. The render server owns a thread pool;
//! each request becomes one task on that pool, and the task's grid iteration fans out
//! across the same pool by rows.

use std::{future::Future, sync::mpsc::Receiver};

use nf_core::{pipeline, NewtonParams};

mod oneshot;

pub struct RenderServer {
    queue: std::sync::mpsc::Sender<ImageRequest>,
}

struct ImageRequest {
    params: NewtonParams,
    result: oneshot::Sender<Completion>,
}

/// Errors that can occur during execution.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// The request itself was bad: an unparsable expression or an out-of-range parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<nf_core::Error> for Error {
    fn from(err: nf_core::Error) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

/// A finished run and its image.
#[derive(Debug)]
pub struct Rendered {
    pub rendering: pipeline::Rendering,
    pub image: image::DynamicImage,
}

pub type Completion = Result<Rendered, Error>;

impl RenderServer {
    pub fn new() -> Result<Self, String> {
        Self::with_threads(rayon::current_num_threads())
    }

    pub fn with_threads(threads: usize) -> Result<Self, String> {
        if threads < 1 {
            return Err("must provide >=1 thread".to_string());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("nf-render-{}", i))
            .build()
            .map_err(|v| format!("error creating thread pool: {}", v))?;

        let (queue, recv) = std::sync::mpsc::channel();
        // Runs until every RenderServer handle (and so the queue) is dropped.
        std::thread::spawn(move || dispatch(pool, recv));

        Ok(RenderServer { queue })
    }

    /// Queue a run; the future resolves when it completes.
    pub fn render(&self, params: NewtonParams) -> impl Future<Output = Completion> {
        let recv = self.submit(params);
        async move {
            match recv.await {
                Ok(v) => v,
                Err(e) => Err(Error::Internal(e.to_string())),
            }
        }
    }

    /// Queue a run and block the calling thread until it completes.
    pub fn render_blocking(&self, params: NewtonParams) -> Completion {
        match self.submit(params).recv() {
            Ok(v) => v,
            Err(e) => Err(Error::Internal(e.to_string())),
        }
    }

    fn submit(&self, params: NewtonParams) -> oneshot::Receiver<Completion> {
        let (result, recv) = oneshot::new();
        let req = ImageRequest { params, result };
        if let Err(std::sync::mpsc::SendError(req)) = self.queue.send(req) {
            req.result.send(Err(Error::Internal(
                "rendering server has terminated".to_string(),
            )));
        }
        recv
    }
}

fn dispatch(pool: rayon::ThreadPool, receiver: Receiver<ImageRequest>) {
    let span = tracing::info_span!("dispatch thread");
    let _guard = span.enter();

    for req in receiver.iter() {
        // FIFO, so runs finish in about the order they were asked for.
        pool.spawn_fifo(|| render(req));
    }
    tracing::debug!("request queue closed, dispatch exiting");
}

fn render(req: ImageRequest) {
    let ImageRequest { params, result } = req;
    if result.is_cancelled() {
        tracing::debug!("request for {} cancelled before start", params.function);
        return;
    }
    result.send(newton_render(&params));
}

fn newton_render(params: &NewtonParams) -> Completion {
    tracing::info!(
        "starting newton run for f(z) = {} at {}x{}",
        params.function,
        params.size.width,
        params.size.height
    );
    let span = tracing::info_span!("render-newton");
    let _guard = span.enter();

    let rendering = pipeline::compute(params).map_err(|err| {
        tracing::info!("rejected parameters {:?}: {}", params, err);
        Error::from(err)
    })?;
    tracing::debug!("newton-computed");

    let image = rendering.image().map_err(|err| {
        tracing::error!("rendering error: for parameters {:?}: {}", params, err);
        Error::Internal(format!("rendering error: {}", err))
    })?;
    tracing::debug!("newton-rendered");

    Ok(Rendered { rendering, image })
}
