/// Cache file for aizynthfinder routes inside the output directory.
pub const AIZ_ROUTES_CACHE: &str = "aiz_routes.json";

/// Extension of HDF5 route caches, which are detected but not read.
pub const HDF5_EXTENSION: &str = "hdf5";

/// Cache file for Postera routes converted to the aizynthfinder tree format.
pub const POS_ROUTES_CACHE: &str = "pos_routes_aiz_format.json";

/// Report file names, in the order they are written.
pub const POPULAR_TEMPLATES_FILE: &str = "popular_templates.json";
pub const UNUSED_TEMPLATES_FILE: &str = "unused_templates.json";
pub const OVERLOOKED_TEMPLATES_FILE: &str = "overlooked_templates.json";
pub const NOVEL_TEMPLATES_FILE: &str = "novel_templates.json";

/// Column holding the canonical template SMARTS in the template library.
pub const TEMPLATE_COLUMN: &str = "canonical_smarts";

/// Stock table columns.
pub const STOCK_KEY_COLUMN: &str = "inchi_key";
pub const STOCK_PRICE_COLUMN: &str = "price";

/// Environment variable holding the Postera API key.
pub const POSTERA_API_KEY_VAR: &str = "POSTERA_API_KEY";

/// Default executable used to run aizynthfinder.
pub const DEFAULT_AIZYNTHCLI: &str = "aizynthcli";

/// Default fraction of used templates reported as popular.
pub const DEFAULT_POPULAR_FRACTION: f64 = 0.1;

/// Route scoring parameters.
pub mod scoring {
    /// Weight of the in-stock fraction in the state score.
    pub const STATE_STOCK_WEIGHT: f64 = 0.95;

    /// Weight of the squashed route depth in the state score.
    pub const STATE_DEPTH_WEIGHT: f64 = 0.05;

    /// Depth at which the squashed depth term reaches 0.5.
    pub const STATE_DEPTH_OFFSET: f64 = 4.0;

    /// Unpriced leaves cost this many times the most expensive stock entry.
    pub const NOT_IN_STOCK_MULTIPLIER: f64 = 10.0;
}

/// Postera defaults.
pub mod postera {
    pub const DEFAULT_URL: &str = "https://api.postera.ai/api/v1/retrosynthesis/batch/";
    pub const DEFAULT_MAX_SEARCH_DEPTH: u32 = 3;
    pub const DEFAULT_BATCH_SIZE: usize = 10;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Upper bound on a single batch response body.
    pub const MAX_RESPONSE_SIZE: u64 = 256 * 1024 * 1024;
}
