pub mod config;
pub mod logger;
pub mod mapper;
pub mod pipeline;
pub mod record;
pub mod timing;

pub use config::IngestConfig;
pub use mapper::BadRowPolicy;
pub use pipeline::{run, scrape_and_persist, IngestError, Pipeline, RunReport};

// 라이브러리가 로드될 때 .env를 읽는다
#[ctor::ctor]
fn load_dotenv() {
    dotenv::dotenv().ok();
}
