pub const APP_NAME: &str = "armory";

pub mod cache {

    pub const DEFAULT_TTL_SECONDS: u64 = 600;
}

pub mod upstream {

    pub const DEFAULT_BASE_URL: &str =
        "https://raw.githubusercontent.com/ByMykel/CSGO-API/main/public/api/en";

    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
}

pub mod limits {

    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Rows per multi-row INSERT statement.
    pub const INSERT_CHUNK_SIZE: usize = 100;
}
