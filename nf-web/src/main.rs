use nf_render::RenderServer;
use nf_web::root_routes;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Address to listen on, unless overridden by this environment variable.
const LISTEN_VAR: &str = "NF_LISTEN";
const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let web_rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("could not construct Tokio runtime");
    let render_server = RenderServer::new().expect("could not start render server");
    let listen = std::env::var(LISTEN_VAR).unwrap_or_else(|_| DEFAULT_LISTEN.to_owned());

    let server = async {
        let app = root_routes(render_server).layer(TraceLayer::new_for_http());
        let listener = tokio::net::TcpListener::bind(&listen).await?;
        tracing::info!("listening on {}", listen);
        axum::serve(listener, app).await
    };
    web_rt.block_on(server).expect("server terminated");
}
