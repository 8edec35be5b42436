// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{DatasetArgs, parse_filters};
use anyhow::Result;
use dataset::expression::is_trivial;
use dataset::{DataSource, ScanOptions};
use std::fmt::Write;
use std::sync::Arc;

/// Fragments command - lists the files a filtered scan would read
///
/// Each line is a file path followed by its partition predicate. With
/// `show_tree` the annotated directory tree is printed first.
pub fn fragments_command<F>(args: &DatasetArgs, show_tree: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let discovery = args.open_discovery()?;
    let schema = discovery.inspect()?;
    let source = discovery.finish(&schema)?;
    let filter = parse_filters(&args.filters, &schema)?;
    diagnostics::log_debug!("Listing fragments matching {filter}", filter: filter.to_string());

    let mut output = String::new();
    if show_tree {
        write!(output, "{source}")?;
    }

    let options = Arc::new(ScanOptions::default().with_filter(filter));
    let mut count = 0;
    for fragment in source.get_fragments(options) {
        let fragment = fragment?;
        let path = fragment.source().describe();
        let partition = fragment.partition_expression();
        if is_trivial(partition) {
            writeln!(output, "{path}")?;
        } else {
            writeln!(output, "{path}\t{partition}")?;
        }
        count += 1;
    }
    writeln!(output, "{count} fragments")?;

    handler(&output);
    Ok(())
}
