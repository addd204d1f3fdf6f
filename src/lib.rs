// setup-fnm: an idempotent bootstrap for fnm (Fast Node Manager).
//
// The tool detects existing Node.js version managers, installs fnm through the
// system package manager when it is absent, and wires fnm's activation snippet
// into the startup sequence of each requested shell so that per-directory
// Node.js version switching happens automatically in every new session.
//
// Everything here is built from a small set of primitives: idempotent mutators
// ("ensure this line is in this file", "ensure this value is in this store"),
// a command/path resolver, and a three-way execution mode (apply / dry-run /
// detect-only) threaded through every operation.

pub mod cli;
pub mod commands;
pub mod installers;
pub mod libs;
pub mod logger;
