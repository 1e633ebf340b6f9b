//! Generates structured text from analyzed LAD/FBD networks.
//!
//! [`emit`] writes the statements of one network. [`emit_block`] frames
//! each network of a block in its own region.
extern crate lad2scl_dsl as dsl;

use dsl::{
    operation::{FbCall, Operation},
    options::ConversionOptions,
    signature::SignatureRegistry,
};
use lad2scl_analyzer::stages::{LogicBody, NetworkLogic};

use renderer::StatementRenderer;

pub mod expression;
mod renderer;

/// Writes the call statements then the operations of one network, one
/// line per element. Lines are not terminated.
pub fn emit(
    fb_calls: &[FbCall],
    operations: &[Operation],
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> Vec<String> {
    let mut renderer = StatementRenderer::new(registry, options);
    for call in fb_calls {
        renderer.fb_call(call);
    }
    for op in operations {
        renderer.operation(op);
    }
    renderer.into_lines()
}

/// Writes the executable body of a block. Each network becomes one region.
/// Regions are never nested.
pub fn emit_block(
    networks: &[NetworkLogic],
    registry: &SignatureRegistry,
    options: &ConversionOptions,
) -> Vec<String> {
    let mut renderer = StatementRenderer::new(registry, options);

    if networks.is_empty() {
        renderer.write_line("REGION Logic");
        renderer.indent();
        renderer.write_line("// TODO: The block has no networks to convert");
        renderer.outdent();
        renderer.write_line("END_REGION");
        return renderer.into_lines();
    }

    for network in networks {
        let title = network
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(|title| title.replace('"', "'"))
            .unwrap_or_else(|| format!("Network {}", network.id));
        renderer.write_line(&format!("REGION \"{}\"", title));
        renderer.indent();

        if let Some(comment) = &network.comment {
            for line in comment.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
                renderer.write_line(&format!("// {}", line));
            }
        }

        match &network.body {
            LogicBody::Text(code) => {
                for line in code.lines() {
                    renderer.write_line(line.trim_end());
                }
            }
            LogicBody::Graph {
                fb_calls,
                operations,
            } => {
                for call in fb_calls {
                    renderer.fb_call(call);
                }
                for op in operations {
                    renderer.operation(op);
                }
            }
        }

        renderer.outdent();
        renderer.write_line("END_REGION");
        renderer.write_line("");
    }

    renderer.into_lines()
}
