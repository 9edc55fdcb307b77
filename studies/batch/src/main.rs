//! 批量运行: 读取 `master_metadata.csv`, 对每个患者执行流水线,
//! 导出报告 JSON / 纯文本临床报告 (以及可选的切片 PNG), 最后打印汇总.

mod result;
mod runner;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let result = runner::run()?;
    result.analyze()?;
    Ok(())
}
