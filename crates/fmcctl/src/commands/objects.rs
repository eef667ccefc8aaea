//! Object lookup handlers.

use serde::Serialize;
use tabled::Tabled;

use fmc_core::{CoreError, ManagedFmc, NamedObject, ObjectKind};

use crate::cli::{GlobalOpts, ObjectKindArg, ObjectsArgs, ObjectsCommand};
use crate::error::CliError;
use crate::output;

impl From<ObjectKindArg> for ObjectKind {
    fn from(kind: ObjectKindArg) -> Self {
        match kind {
            ObjectKindArg::DeviceGroup => Self::DeviceGroup,
            ObjectKindArg::AccessPolicy => Self::AccessPolicy,
            ObjectKindArg::NatPolicy => Self::NatPolicy,
            ObjectKindArg::SecurityZone => Self::SecurityZone,
            ObjectKindArg::Network => Self::Network,
            ObjectKindArg::Host => Self::Host,
            ObjectKindArg::Port => Self::Port,
            ObjectKindArg::Device => Self::Device,
        }
    }
}

#[derive(Serialize)]
struct ResolvedObject {
    name: String,
    kind: ObjectKind,
    id: String,
}

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
}

pub async fn handle(
    fmc: &mut ManagedFmc,
    args: ObjectsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ObjectsCommand::Resolve { name, kind } => {
            let found = match kind.map(ObjectKind::from) {
                Some(kind) => fmc
                    .client()
                    .resolve_id(kind, &name)
                    .await?
                    .map(|id| (kind, id)),
                None => fmc.client().find_object(&name).await?,
            };
            let (kind, id) = found.ok_or_else(|| {
                let entity = kind.map_or("Object".to_owned(), |k| ObjectKind::from(k).to_string());
                CliError::from(CoreError::not_found(&entity, &name))
            })?;

            let resolved = ResolvedObject { name, kind, id };
            let out = output::render_single(
                &global.output,
                &resolved,
                |r| format!("{} ({}): {}", r.name, r.kind, r.id),
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ObjectsCommand::List { kind } => {
            let objects = fmc.client().list_objects(kind.into()).await?;
            let out = output::render_list(
                &global.output,
                &objects,
                |o: &NamedObject| ObjectRow {
                    id: o.id.clone(),
                    name: o.name.clone(),
                    kind: o.kind.clone(),
                },
                |o| o.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
