use once_cell::sync::OnceCell;

mkenv::make_config! {
    /// The environment used by this crate.
    pub struct LibEnv {
        /// The maximum number of members a clan can hold.
        pub max_clan_members: {
            var_name: "COMMUNITY_MAX_CLAN_MEMBERS",
            layers: [
                parsed_from_str<u64>(),
                or_default_val(|| 100),
            ],
            description: "The maximum number of members a clan can hold",
            default_val_fmt: "100",
        }
    }
}

static ENV: OnceCell<LibEnv> = OnceCell::new();

/// Initializes the provided library environment as global.
///
/// If this function has already been called, the provided environment will be ignored.
pub fn init_env(env: LibEnv) {
    let _ = ENV.set(env);
}

/// Returns a static reference to the global library environment.
///
/// **Caution**: To use this function, the [`init_env()`] function must have been called
/// at the start of the program.
pub fn env() -> &'static LibEnv {
    ENV.get().unwrap()
}
