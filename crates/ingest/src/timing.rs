use std::future::Future;
use std::time::Instant;
use tracing::info;

/// 단계 하나를 실행하고 걸린 시간을 남긴다
pub async fn timed<F, T>(stage: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let output = future.await;
    info!(
        "{} finished in {:.2}s",
        stage,
        started.elapsed().as_secs_f64()
    );
    output
}
