// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::DatasetArgs;
use anyhow::Result;
use std::fmt::Write;

/// Inspect command - prints the discovered schema and partitioning
pub fn inspect_command<F>(args: &DatasetArgs, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let discovery = args.open_discovery()?;
    let schema = discovery.inspect()?;
    let files = discovery.stats().iter().filter(|s| s.is_file()).count();

    let partitioning = match discovery.partitioning().as_scheme() {
        Some(scheme) => scheme.type_name().to_string(),
        None => "discovered".to_string(),
    };

    let mut output = String::new();
    writeln!(output, "files: {files}")?;
    writeln!(output, "partitioning: {partitioning}")?;
    writeln!(output, "schema:")?;
    for field in schema.fields() {
        let nullable = if field.is_nullable() { "" } else { " not null" };
        writeln!(output, "  {}: {}{nullable}", field.name(), field.data_type())?;
    }
    handler(&output);
    Ok(())
}
