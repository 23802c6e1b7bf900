/*!
Periodic HTTP health probe.

Given a target URL and an interval, issue one GET per tick, measure
latency, classify the outcome into a stable set of result codes and emit
one record per probe to stdout and, optionally, a templated log file.

The [`probe::Prober`] drives the loop; [`config::ProbeConfig`] carries the
immutable per-run settings.
*/

pub mod cli;
pub mod config;
pub mod probe;
