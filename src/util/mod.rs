pub mod config;
pub mod paths;

#[cfg(test)]
pub(crate) mod test_env {
    use std::ffi::OsStr;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Environment mutation is process-global; every test that touches env
    // vars must hold this lock for its whole body.
    pub fn lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    pub fn set(key: &str, val: impl AsRef<OsStr>) {
        unsafe { std::env::set_var(key, val) };
    }

    pub fn remove(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    pub fn save(key: &str) -> Option<std::ffi::OsString> {
        std::env::var_os(key)
    }

    pub fn restore(key: &str, saved: Option<std::ffi::OsString>) {
        match saved {
            Some(val) => set(key, val),
            None => remove(key),
        }
    }
}
