//! src/thread_name.rs
//! Process-global table of human-readable thread names.

use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

static NAMES: OnceLock<RwLock<FxHashMap<ThreadId, Arc<str>>>> = OnceLock::new();

fn table() -> &'static RwLock<FxHashMap<ThreadId, Arc<str>>> {
    NAMES.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Assigns the calling thread a descriptive name.
///
/// The name is recorded in the process-global table consulted on every routed
/// event, and also applied to the OS thread where the platform allows it so
/// external debuggers and `ps` agree with the log output. Entries are never
/// removed; registering again replaces the previous name.
pub fn register_thread_name(name: &str) {
    table().write().insert(thread::current().id(), Arc::from(name));
    set_os_thread_name(name);
}

/// Returns the name registered for the calling thread, if any.
///
/// Threads spawned through [`std::thread::Builder::name`] that never called
/// [`register_thread_name`] fall back to their spawn name.
#[must_use]
pub fn current_thread_label() -> Option<Arc<str>> {
    let id = thread::current().id();
    if let Some(name) = table().read().get(&id) {
        return Some(Arc::clone(name));
    }
    thread::current().name().map(Arc::from)
}

/// Applies the name to the OS thread. The kernel limit on Linux is 15 bytes
/// plus the terminator; longer names are truncated.
#[cfg(target_os = "linux")]
fn set_os_thread_name(name: &str) {
    let truncated: Vec<u8> = name.bytes().filter(|&b| b != 0).take(15).collect();
    if let Ok(cname) = std::ffi::CString::new(truncated) {
        // SAFETY: pthread_self() is the calling thread and the name pointer
        // is a valid nul-terminated string for the duration of the call.
        unsafe {
            libc::pthread_setname_np(libc::pthread_self(), cname.as_ptr());
        }
    }
}

#[cfg(target_os = "macos")]
fn set_os_thread_name(name: &str) {
    let truncated: Vec<u8> = name.bytes().filter(|&b| b != 0).take(63).collect();
    if let Ok(cname) = std::ffi::CString::new(truncated) {
        // SAFETY: the name pointer is a valid nul-terminated string for the
        // duration of the call; macOS only names the calling thread.
        unsafe {
            libc::pthread_setname_np(cname.as_ptr());
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn set_os_thread_name(_name: &str) {}
