use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use serde::Serialize;
use subcurve::error::{with_err_context, ErrorContext, ErrorSource, Result};
use subcurve::io::create_file;
use subcurve::verification::simulation::Lib;
use tera::{Context, Tera};

pub(crate) const NETLIST_TEMPLATE: &str = "netlist.spice";

lazy_static! {
    pub(crate) static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        match tera.add_raw_template(
            NETLIST_TEMPLATE,
            include_str!("../templates/netlist.spice"),
        ) {
            Ok(()) => tera,
            Err(e) => {
                panic!("Encountered errors while parsing Tera templates: {e}");
            }
        }
    };
}

#[derive(Serialize)]
pub(crate) struct NetlistCtx<'a> {
    pub(crate) title: &'a str,
    pub(crate) libs: &'a [Lib],
    pub(crate) includes: &'a [PathBuf],
    pub(crate) analyses: &'a [String],
    pub(crate) directives: &'a [String],
}

pub(crate) fn render_netlist_string(ctx: &NetlistCtx<'_>) -> Result<String> {
    let ctx = Context::from_serialize(ctx)
        .map_err(|e| ErrorSource::Internal(format!("template error: {e}")))?;
    let netlist = TEMPLATES
        .render(NETLIST_TEMPLATE, &ctx)
        .map_err(|e| ErrorSource::Internal(format!("template error: {e}")))?;
    Ok(netlist)
}

pub(crate) fn render_netlist(ctx: &NetlistCtx<'_>, work_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = work_dir.as_ref().join(NETLIST_TEMPLATE);
    let netlist = render_netlist_string(ctx)?;

    let mut file = create_file(&path)?;
    with_err_context(
        std::io::Write::write_all(&mut file, netlist.as_bytes()),
        || ErrorContext::CreateFile(path.clone()),
    )?;

    Ok(path)
}
