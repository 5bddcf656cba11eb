extern crate covisit;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    http::ContentEncoding, middleware, web, App, HttpRequest, HttpResponse, HttpServer,
};
use actix_web::http::header;
use actix_web_prom::PrometheusMetrics;

use covisit::config::AppConfig;
use covisit::dataframeutils::{determine_training_data_statistics, SharedHandlesAndConfig};
use covisit::endpoints::index_resource::internal;
use covisit::endpoints::recommend_resource::v1_recommend;
use covisit::io;
use covisit::sessions::RocksDBSessionStore;
use covisit::sknn::memory::MemoryEngine;
use covisit::sknn::SimilarityComputation;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let neighborhood_size_k = config.model.neighborhood_size_k;
    let sample_size_m = config.model.sample_size_m;
    let normalize = config.model.normalize;
    let num_items_to_recommend = config.model.num_items_to_recommend;
    let max_items_in_session = config.model.max_items_in_session;
    let qty_workers = config.server.num_workers;

    let training_data = io::read_training_data(&config.data.training_data_path);
    let training_data_stats = Arc::new(determine_training_data_statistics(
        &config.data.training_data_path,
        &training_data,
    ));
    let engine = Arc::new(
        MemoryEngine::fit(&training_data, config.model.idf_weight)
            .unwrap_or_else(|error| panic!("Unusable training data: {}", error)),
    );

    println!("start db");
    let session_ttl = Duration::from_secs(30 * 60);
    let db = Arc::new(RocksDBSessionStore::new("./sessions.db", session_ttl));

    println!("start metrics");
    let prometheus = PrometheusMetrics::new("api", Some("/internal/prometheus"), None);

    println!("Done. start httpd at http://{}", &bind_address);
    HttpServer::new(move || {
        let handles_and_config = SharedHandlesAndConfig {
            session_store: db.clone(),
            engine: engine.clone(),
            training_data_stats: training_data_stats.clone(),
            neighborhood_size_k,
            sample_size_m,
            normalize,
            num_items_to_recommend,
            max_items_in_session,
            qty_workers,
            db_compaction_ttl_in_secs: session_ttl.as_secs() as usize,
        };

        App::new()
            .wrap(middleware::Compress::new(ContentEncoding::Identity))
            .wrap(prometheus.clone())
            .wrap(
                middleware::DefaultHeaders::new()
                    .header("Cache-Control", "no-cache, no-store, must-revalidate")
                    .header("Pragma", "no-cache")
                    .header("Expires", "0"),
            )
            .data(handles_and_config)
            .service(v1_recommend)
            .service(internal)
            .service(web::resource("/").route(web::get().to(|_req: HttpRequest| {
                HttpResponse::Found()
                    .header(header::LOCATION, "/internal")
                    .finish()
            })))
    })
    .workers(config.server.num_workers)
    .bind(&bind_address)
    .unwrap_or_else(|_| panic!("Could not bind server to address {}", &bind_address))
    .run()
    .await
}
