// sprig-core - Host process namespace
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `host` namespace: a whitelisted view of the hosting process.

use sprig_reader::{Object, Value};

use crate::namespace::{Namespace, NamespaceRegistry};

/// Name of the namespace holding host globals.
pub const HOST_NS: &str = "host";

/// Globals imported into [`HOST_NS`]. Anything else on the host object is
/// ignored.
pub const HOST_WHITELIST: [&str; 5] = ["args", "env", "cwd", "platform", "pid"];

/// Snapshot the process into a host object. Names the process cannot
/// provide are left unset.
#[must_use]
pub fn host_globals(args: &[String]) -> Object {
    let host = Object::new();
    host.set(
        "args",
        Value::vector(args.iter().map(|arg| Value::string(arg)).collect()),
    );
    host.set(
        "env",
        Value::map(
            std::env::vars()
                .map(|(k, v)| (Value::from(k), Value::from(v)))
                .collect(),
        ),
    );
    if let Ok(cwd) = std::env::current_dir() {
        host.set("cwd", Value::from(cwd.display().to_string()));
    }
    host.set("platform", Value::string(std::env::consts::OS));
    host.set("pid", Value::int(i64::from(std::process::id())));
    host
}

/// Import the whitelisted properties of `host` into the `host` namespace.
pub fn install_host(registry: &NamespaceRegistry, host: &Object) -> Namespace {
    let ns = registry.intern(HOST_NS);
    let allowed = Object::new();
    for name in HOST_WHITELIST {
        if let Some(value) = host.get(name) {
            allowed.set(name, value);
        }
    }
    let imported = ns.import_host(&allowed);
    tracing::debug!(count = imported, "imported host globals");
    ns
}
