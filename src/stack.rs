//! Stack snapshots for recovered panics.
//!
//! By the time `catch_unwind` hands back a payload the panicking frames are
//! gone, so the faulting stack is recorded earlier, from a panic hook. The
//! hook is installed once, the first time a request is supervised, and only
//! records while the current thread is polling a supervised handler. Panics
//! anywhere else go to whatever hook was installed before.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt::Write as _;
use std::marker::PhantomData;
use std::panic::{self, PanicHookInfo};
use std::sync::Once;
use std::thread;

thread_local! {
    static SUPERVISED: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Marks the current thread as supervised until dropped.
///
/// Not `Send`: it must be dropped on the thread that created it.
pub(crate) struct Supervision {
    _thread_bound: PhantomData<*const ()>,
}

pub(crate) fn supervise() -> Supervision {
    INSTALL_HOOK.call_once(install_hook);
    SUPERVISED.with(|depth| depth.set(depth.get() + 1));
    Supervision { _thread_bound: PhantomData }
}

impl Drop for Supervision {
    fn drop(&mut self) {
        let _ = SUPERVISED.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Drops any snapshot recorded on this thread.
pub(crate) fn discard() {
    let _ = LAST_PANIC.try_with(RefCell::take);
}

#[cfg(test)]
pub(crate) fn depth() -> usize {
    SUPERVISED.with(Cell::get)
}

fn install_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if SUPERVISED.try_with(Cell::get).unwrap_or(0) == 0 {
            previous(info);
            return;
        }
        let report = faulting_stack(info);
        let _ = LAST_PANIC.try_with(|slot| slot.replace(Some(report)));
    }));
}

fn faulting_stack(info: &PanicHookInfo<'_>) -> String {
    let mut out = format!("thread '{}' [panicked]", thread_name());
    if let Some(location) = info.location() {
        let _ = write!(out, " at {location}");
    }
    let _ = write!(out, ":\n{}", Backtrace::force_capture());
    out
}

fn boundary_stack() -> String {
    format!("thread '{}' [recovering]:\n{}", thread_name(), Backtrace::force_capture())
}

fn thread_name() -> String {
    thread::current().name().unwrap_or("<unnamed>").to_owned()
}

/// Writes a stack snapshot for the most recent supervised panic on this
/// thread into `buf` and returns the number of bytes written.
///
/// With `all` set, a summary of every task on the current tokio runtime is
/// appended. It is a best-effort view of that instant and may include tasks
/// unrelated to the fault.
///
/// The snapshot is truncated to `buf.len()`; a truncated snapshot may end in
/// the middle of a UTF-8 sequence. If no panic was recorded (for example the
/// application replaced the panic hook) the stack at the call site is used
/// instead.
pub fn capture(buf: &mut [u8], all: bool) -> usize {
    let mut report = LAST_PANIC
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
        .unwrap_or_else(boundary_stack);

    if all {
        append_runtime(&mut report);
    }

    let length = report.len().min(buf.len());
    buf[..length].copy_from_slice(&report.as_bytes()[..length]);
    length
}

fn append_runtime(report: &mut String) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let metrics = handle.metrics();
            let _ = write!(
                report,
                "\nruntime [{:?}]: {} workers, {} alive tasks\n",
                handle.runtime_flavor(),
                metrics.num_workers(),
                metrics.num_alive_tasks(),
            );
        }
        Err(_) => report.push_str("\nruntime: none\n"),
    }
}
