use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs a test logger once per binary. `RUST_LOG` overrides the level.
pub fn init_test_logger() {
    INIT.call_once(|| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Info)
            .filter_module("chain_table", LevelFilter::Debug)
            .format_timestamp_millis()
            .parse_default_env()
            .is_test(true);
        // Another harness may have installed a logger already.
        let _ = builder.try_init();
    });
}
