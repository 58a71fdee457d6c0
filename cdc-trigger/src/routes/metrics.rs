use actix_web::{HttpResponse, Responder, get, web::ThinData};
use metrics_exporter_prometheus::PrometheusHandle;

/// Content type of the Prometheus text exposition format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[get("/metrics")]
pub async fn metrics(handle: ThinData<PrometheusHandle>) -> impl Responder {
    HttpResponse::Ok()
        .content_type(PROMETHEUS_CONTENT_TYPE)
        .body(handle.render())
}
