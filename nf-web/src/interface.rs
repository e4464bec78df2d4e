//! User-interface rendering for the Newton fractal explorer.

use axum::extract::Query;
use maud::{html, Markup, DOCTYPE};
use nf_core::{pipeline, Complex64};

use crate::WindowParams;

/// Render the user interface.
///
/// Expressions are parsed and the roots found here, so that a bad expression is reported
/// in place of the image.
pub async fn interface(Query(query): Query<WindowParams>) -> Markup {
    // Re-render the query from the clamped parameters, so the image URL matches the form.
    let query = query.clamped();
    let params = query.to_params();
    let analysis = tokio::task::spawn_blocking(move || pipeline::analyze(&params))
        .await
        .map_err(|err| {
            tracing::error!("analysis task failed: {}", err);
            format!("internal error: {}", err)
        })
        .and_then(|res| res.map_err(|err| err.to_string()));

    html! {
        (DOCTYPE)
        head {
            title { "Newton Fractal Explorer" }
            link rel="stylesheet" href="/static/style.css";
            script src="/static/app.js" async {}
        }
        body {
            h1 { a href="/" { "Newton Fractal Explorer" } }
            (form(&query))
            @match analysis {
                Ok(analysis) => (result(&query, &analysis)),
                Err(message) => {
                    div class="error" {
                        h2 { "Error" }
                        p { (message) }
                    }
                }
            }
        }
    }
}

fn form(query: &WindowParams) -> Markup {
    html! {
        form id="form-rerender" action="/" autocomplete="off" class="parameters" {
            h2 { "Function" }
            p {
                label { "f(z) = " }
                input id="input-f" name="f" type="text" size="40" value=(query.f);
                " "
                label { "f'(z) = " }
                input id="input-df" name="df" type="text" size="40" value=(query.df)
                    placeholder="blank: derive f";
            }
            h2 { "Target area" }
            p {
                label { "Center X:" }
                input id="input-x" name="x" type="number" step="any" min="-5" max="5" value=(query.x);
                " "
                label { "Center Y:" }
                input id="input-y" name="y" type="number" step="any" min="-5" max="5" value=(query.y);
                " "
                label { "Zoom (half-width):" }
                input id="input-zoom" name="zoom" type="number" step="any" min="0.1" max="5" value=(query.zoom);
            }
            h2 { "Rendering settings" }
            p {
                label { "Width (pixels):" }
                input name="width" type="number" min="200" max="1000" value=(query.width);
                " "
                label { "Height (pixels):" }
                input name="height" type="number" min="200" max="1000" value=(query.height);
                " "
                label { "Max iterations:" }
                input name="iters" type="number" min="10" max="200" value=(query.iters);
                " "
                label { "Tolerance:" }
                input name="tol" type="number" step="any" min="1e-8" max="1e-3" value=(query.tol);
                " "
                label { "Color seed:" }
                input name="seed" type="number" min="0" value=(query.seed);
            }
            input value="Go" type="submit";
        }
        p {
            a href="/" { "Reset" }
        }
    }
}

fn result(query: &WindowParams, analysis: &pipeline::Analysis) -> Markup {
    let query_str = query.query_string();
    html! {
        div {
            h2 { "Roots" }
            p {
                "f(z) = " code { (analysis.prepared.function.to_string()) }
                ", f'(z) = " code { (analysis.prepared.derivative.to_string()) }
            }
            @if analysis.roots.is_empty() {
                p { "No roots found; every point is unclassified." }
            } @else {
                ol class="roots" {
                    @for root in &analysis.roots {
                        li { (format_root(*root)) }
                    }
                }
            }
        }
        div class="render-pane" {
            h2 { "Rendering" }
            p {
                "Click on the image to re-center. Zoom: "
                button id="button-out" { " - " }
                " "
                button id="button-in" { " + " }
            }
            img src=(format!("/render?{}", query_str)) width=(query.width) height=(query.height)
                class="img-fractal" data-x=(query.x) data-y=(query.y) data-zoom=(query.zoom);
            p {
                a href=(format!("/download?{}", query_str)) download=(crate::render::DOWNLOAD_NAME) {
                    "Download PNG"
                }
            }
        }
    }
}

fn format_root(root: Complex64) -> String {
    if root.im.is_sign_negative() {
        format!("{:.6} - {:.6}i", root.re, -root.im)
    } else {
        format!("{:.6} + {:.6}i", root.re, root.im)
    }
}
