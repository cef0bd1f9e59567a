/// Initializes env_logger for the test binary. Safe to call from every test;
/// only the first call takes effect.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}
