fn main() -> anyhow::Result<()> {
    init_tracing();
    copy_chat::app::run()
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
