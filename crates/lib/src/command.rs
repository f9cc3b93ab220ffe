//! Build command derivation.

use crate::profile::{BuildSpec, OutputKind, Variant};

/// Task verb for an output kind.
fn verb(kind: OutputKind) -> &'static str {
  match kind {
    OutputKind::Package => "assemble",
    OutputKind::Bundle => "bundle",
  }
}

/// Title-cased variant name as it appears in task names.
fn task_suffix(variant: Variant) -> &'static str {
  match variant {
    Variant::Debug => "Debug",
    Variant::Release => "Release",
  }
}

/// The build invocation for `spec`.
///
/// An explicit command is returned unchanged. Otherwise the result is one of
/// `assembleRelease`, `assembleDebug`, `bundleRelease` or `bundleDebug`.
pub fn derive_command(spec: &BuildSpec) -> String {
  if let Some(command) = &spec.explicit_command {
    return command.clone();
  }
  format!("{}{}", verb(spec.output_kind), task_suffix(spec.variant))
}
