//! Shared fakes for the pool test suites.
//!
//! The pool's collaborators are all traits, so the tests substitute
//! recording fakes: a command runner that captures every [`CommandSpec`]
//! and can inject failures per program, resource pools that log releases
//! and removals, and rootfs providers that log provide/clean-up calls.

#![allow(dead_code)]

use corral::{
    CommandRunner, CommandSpec, Error, PortPool, QuotaManager, Result, RootfsProvider, RootfsUrl,
    SubnetPool, UidPool,
};
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

// =============================================================================
// Recording Command Runner
// =============================================================================

type RunHook = Box<dyn Fn(&CommandSpec) -> Result<()> + Send + Sync>;

/// Command runner that records every execution and can fail on demand.
#[derive(Default)]
pub struct RecordingRunner {
    executed: Mutex<Vec<CommandSpec>>,
    hooks: Mutex<Vec<(String, RunHook)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook invoked whenever `program` runs; its result becomes
    /// the run result.
    pub fn when_running(
        &self,
        program: impl Into<String>,
        hook: impl Fn(&CommandSpec) -> Result<()> + Send + Sync + 'static,
    ) {
        self.hooks
            .lock()
            .unwrap()
            .push((program.into(), Box::new(hook)));
    }

    /// Every command run so far, in order.
    pub fn executed(&self) -> Vec<CommandSpec> {
        self.executed.lock().unwrap().clone()
    }

    /// The commands whose program matches exactly.
    pub fn commands_for(&self, program: &str) -> Vec<CommandSpec> {
        self.executed()
            .into_iter()
            .filter(|spec| spec.program == program)
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<()> {
        self.executed.lock().unwrap().push(spec.clone());

        let hooks = self.hooks.lock().unwrap();
        for (program, hook) in hooks.iter() {
            if *program == spec.program {
                return hook(spec);
            }
        }

        Ok(())
    }
}

/// Asserts that `expected` appears within the executed history in order
/// (other commands may be interleaved).
pub fn assert_executed_serially(runner: &RecordingRunner, expected: &[CommandSpec]) {
    let executed = runner.executed();
    let mut cursor = 0;

    for want in expected {
        match executed[cursor..].iter().position(|got| got == want) {
            Some(offset) => cursor += offset + 1,
            None => panic!(
                "expected command not executed (in order): {:?}\nexecuted: {:#?}",
                want, executed
            ),
        }
    }
}

// =============================================================================
// Fake Resource Pools
// =============================================================================

/// Uid pool handing out sequential uids from a starting value.
pub struct FakeUidPool {
    next: AtomicU32,
    initial_size: AtomicUsize,
    released: Mutex<Vec<u32>>,
    removed: Mutex<Vec<u32>>,
    fail_acquire: AtomicBool,
    fail_remove: AtomicBool,
}

impl FakeUidPool {
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
            initial_size: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            fail_acquire: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
        }
    }

    pub fn set_initial_size(&self, size: usize) {
        self.initial_size.store(size, Ordering::SeqCst);
    }

    pub fn fail_acquire(&self) {
        self.fail_acquire.store(true, Ordering::SeqCst);
    }

    pub fn fail_remove(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    pub fn released(&self) -> Vec<u32> {
        self.released.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<u32> {
        self.removed.lock().unwrap().clone()
    }
}

impl UidPool for FakeUidPool {
    fn acquire(&self) -> Result<u32> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(Error::PoolExhausted { pool: "uid" });
        }
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn release(&self, uid: u32) {
        self.released.lock().unwrap().push(uid);
    }

    fn remove(&self, uid: u32) -> Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Error::UidTaken(uid));
        }
        self.removed.lock().unwrap().push(uid);
        Ok(())
    }

    fn initial_size(&self) -> usize {
        self.initial_size.load(Ordering::SeqCst)
    }
}

/// Subnet pool carving sequential /30s from a configured CIDR.
pub struct FakeSubnetPool {
    network: Ipv4Network,
    next_offset: AtomicU32,
    initial_size: AtomicUsize,
    released: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    fail_acquire: AtomicBool,
    fail_remove: AtomicBool,
}

impl FakeSubnetPool {
    pub fn new(network: Ipv4Network) -> Self {
        Self {
            network,
            next_offset: AtomicU32::new(0),
            initial_size: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            fail_acquire: AtomicBool::new(false),
            fail_remove: AtomicBool::new(false),
        }
    }

    pub fn set_initial_size(&self, size: usize) {
        self.initial_size.store(size, Ordering::SeqCst);
    }

    pub fn fail_acquire(&self) {
        self.fail_acquire.store(true, Ordering::SeqCst);
    }

    pub fn fail_remove(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl SubnetPool for FakeSubnetPool {
    fn network(&self) -> Ipv4Network {
        self.network
    }

    fn acquire(&self) -> Result<Ipv4Network> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(Error::PoolExhausted { pool: "subnet" });
        }

        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let base = u32::from(self.network.network()) + offset * 4;
        Ok(Ipv4Network::new(Ipv4Addr::from(base), 30).unwrap())
    }

    fn release(&self, subnet: Ipv4Network) {
        self.released.lock().unwrap().push(subnet.to_string());
    }

    fn remove(&self, subnet: Ipv4Network) -> Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Error::SubnetTaken(subnet));
        }
        self.removed.lock().unwrap().push(subnet.to_string());
        Ok(())
    }

    fn initial_size(&self) -> usize {
        self.initial_size.load(Ordering::SeqCst)
    }
}

/// Port pool handing out sequential ports, with an optional failure on the
/// n-th remove call.
pub struct FakePortPool {
    next: AtomicU32,
    initial_size: AtomicUsize,
    remove_calls: AtomicUsize,
    fail_remove_on_call: AtomicUsize,
    released: Mutex<Vec<u16>>,
    removed: Mutex<Vec<u16>>,
}

impl FakePortPool {
    pub fn new(start: u16) -> Self {
        Self {
            next: AtomicU32::new(start as u32),
            initial_size: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            fail_remove_on_call: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    /// Makes the n-th (1-based) remove call fail.
    pub fn fail_remove_on_call(&self, n: usize) {
        self.fail_remove_on_call.store(n, Ordering::SeqCst);
    }

    pub fn released(&self) -> Vec<u16> {
        self.released.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<u16> {
        self.removed.lock().unwrap().clone()
    }
}

impl PortPool for FakePortPool {
    fn acquire(&self) -> Result<u16> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst) as u16)
    }

    fn release(&self, port: u16) {
        self.released.lock().unwrap().push(port);
    }

    fn remove(&self, port: u16) -> Result<()> {
        let call = self.remove_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_remove_on_call.load(Ordering::SeqCst) {
            return Err(Error::PortTaken(port));
        }
        self.removed.lock().unwrap().push(port);
        Ok(())
    }

    fn initial_size(&self) -> usize {
        self.initial_size.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Fake Rootfs Provider
// =============================================================================

/// Provider that records provide/clean-up calls.
pub struct FakeRootfsProvider {
    provide_result: Mutex<PathBuf>,
    provided: Mutex<Vec<(String, RootfsUrl)>>,
    cleaned_up: Mutex<Vec<String>>,
    fail_provide: AtomicBool,
    fail_clean_up: AtomicBool,
}

impl FakeRootfsProvider {
    pub fn new() -> Self {
        Self {
            provide_result: Mutex::new(PathBuf::new()),
            provided: Mutex::new(Vec::new()),
            cleaned_up: Mutex::new(Vec::new()),
            fail_provide: AtomicBool::new(false),
            fail_clean_up: AtomicBool::new(false),
        }
    }

    pub fn set_provide_result(&self, path: impl Into<PathBuf>) {
        *self.provide_result.lock().unwrap() = path.into();
    }

    pub fn fail_provide(&self) {
        self.fail_provide.store(true, Ordering::SeqCst);
    }

    pub fn fail_clean_up(&self) {
        self.fail_clean_up.store(true, Ordering::SeqCst);
    }

    pub fn provided(&self) -> Vec<(String, RootfsUrl)> {
        self.provided.lock().unwrap().clone()
    }

    pub fn cleaned_up(&self) -> Vec<String> {
        self.cleaned_up.lock().unwrap().clone()
    }
}

impl RootfsProvider for FakeRootfsProvider {
    fn provide(&self, id: &str, url: &RootfsUrl) -> Result<PathBuf> {
        if self.fail_provide.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("provide failed")));
        }
        self.provided
            .lock()
            .unwrap()
            .push((id.to_string(), url.clone()));
        Ok(self.provide_result.lock().unwrap().clone())
    }

    fn clean_up(&self, id: &str) -> Result<()> {
        if self.fail_clean_up.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("clean up failed")));
        }
        self.cleaned_up.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

// =============================================================================
// Fake Quota Manager
// =============================================================================

/// Quota manager with a configurable mount point.
pub struct FakeQuotaManager {
    mount_point: Mutex<PathBuf>,
}

impl FakeQuotaManager {
    pub fn new() -> Self {
        Self {
            mount_point: Mutex::new(PathBuf::new()),
        }
    }

    pub fn set_mount_point(&self, path: impl Into<PathBuf>) {
        *self.mount_point.lock().unwrap() = path.into();
    }
}

impl QuotaManager for FakeQuotaManager {
    fn mount_point(&self) -> Result<PathBuf> {
        Ok(self.mount_point.lock().unwrap().clone())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
