//! Parcel commands.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::client::{NewParcel, Parcel, ParcelUpdate};
use crate::output::{print_info, print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Parcel ID.
    id: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Recipient name.
    #[arg(long)]
    name: String,

    #[arg(long)]
    street: String,

    #[arg(long)]
    street_number: i32,

    #[arg(long)]
    post_code: i32,

    #[arg(long)]
    region: String,

    #[arg(long)]
    country: String,

    /// Mark the parcel as already handed out.
    #[arg(long)]
    handed_out: bool,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Parcel ID.
    id: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    street: Option<String>,

    #[arg(long)]
    street_number: Option<i32>,

    #[arg(long)]
    post_code: Option<i32>,

    #[arg(long)]
    region: Option<String>,

    #[arg(long)]
    country: Option<String>,

    /// true or false.
    #[arg(long)]
    handed_out: Option<bool>,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Parcel ID.
    id: String,
}

#[derive(Debug, Args)]
pub struct LabelArgs {
    /// Parcel ID.
    id: String,

    /// Where to write the PDF. Defaults to `<id>.pdf`.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Table row for a parcel.
#[derive(Debug, Serialize, Tabled)]
struct ParcelRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Address")]
    address: String,

    #[tabled(rename = "Arrived")]
    arrived: String,

    #[tabled(rename = "Handed out")]
    handed_out: String,
}

impl From<&Parcel> for ParcelRow {
    fn from(parcel: &Parcel) -> Self {
        Self {
            id: parcel.id.clone(),
            name: parcel.name.clone(),
            address: format!(
                "{} {}, {} {}, {}",
                parcel.street, parcel.street_number, parcel.post_code, parcel.region, parcel.country
            ),
            arrived: parcel.arrived_at.format("%Y-%m-%d %H:%M").to_string(),
            handed_out: if parcel.handed_out { "yes" } else { "no" }.to_string(),
        }
    }
}

impl From<CreateArgs> for NewParcel {
    fn from(args: CreateArgs) -> Self {
        Self {
            name: args.name,
            street: args.street,
            street_number: args.street_number,
            post_code: args.post_code,
            region: args.region,
            country: args.country,
            handed_out: args.handed_out,
        }
    }
}

impl UpdateArgs {
    fn into_parts(self) -> (String, ParcelUpdate) {
        let update = ParcelUpdate {
            name: self.name,
            street: self.street,
            street_number: self.street_number,
            post_code: self.post_code,
            region: self.region,
            country: self.country,
            handed_out: self.handed_out,
        };
        (self.id, update)
    }
}

pub async fn list(ctx: CommandContext) -> Result<()> {
    let parcels = ctx.client()?.list_parcels().await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parcels)?),
        OutputFormat::Table => {
            let rows: Vec<ParcelRow> = parcels.iter().map(ParcelRow::from).collect();
            print_output(&rows, ctx.format);
        }
    }
    Ok(())
}

pub async fn get(ctx: CommandContext, args: GetArgs) -> Result<()> {
    let parcel = ctx.client()?.get_parcel(&args.id).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parcel)?),
        OutputFormat::Table => print_single(&ParcelRow::from(&parcel), ctx.format),
    }
    Ok(())
}

pub async fn create(ctx: CommandContext, args: CreateArgs) -> Result<()> {
    let name = args.name.clone();
    ctx.client()?.create_parcel(&args.into()).await?;

    print_success(&format!("Registered parcel for {name}"));
    print_info("Run `parcelctl list` to see its id");
    Ok(())
}

pub async fn update(ctx: CommandContext, args: UpdateArgs) -> Result<()> {
    let (id, update) = args.into_parts();
    if update.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --handed-out true");
    }

    ctx.client()?.update_parcel(&id, &update).await?;

    print_success(&format!("Updated parcel {id}"));
    Ok(())
}

pub async fn remove(ctx: CommandContext, args: RemoveArgs) -> Result<()> {
    ctx.client()?.remove_parcel(&args.id).await?;

    print_success(&format!("Removed parcel {}", args.id));
    Ok(())
}

pub async fn label(ctx: CommandContext, args: LabelArgs) -> Result<()> {
    let client = ctx.client()?;
    let bytes = client.download_label(&args.id).await?;

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", args.id)));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write label to {}", path.display()))?;

    print_success(&format!("Saved label to {}", path.display()));
    print_info(&format!("Label URL: {}", client.label_url(&args.id)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parcel() -> Parcel {
        Parcel {
            id: "oJZWV".to_string(),
            arrived_at: chrono::Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap(),
            name: "Box A".to_string(),
            street: "Main".to_string(),
            street_number: 1,
            post_code: 1000,
            region: "R".to_string(),
            country: "C".to_string(),
            handed_out: true,
        }
    }

    #[test]
    fn test_row_formatting() {
        let row = ParcelRow::from(&parcel());
        assert_eq!(row.address, "Main 1, 1000 R, C");
        assert_eq!(row.arrived, "2024-03-09 12:30");
        assert_eq!(row.handed_out, "yes");
    }

    #[test]
    fn test_json_keeps_api_field_names() {
        let value = serde_json::to_value(vec![parcel()]).unwrap();
        assert_eq!(value[0]["handedOut"], true);
        assert_eq!(value[0]["streetNumber"], 1);
    }

    #[test]
    fn test_update_args_into_parts() {
        let args = UpdateArgs {
            id: "oJZWV".to_string(),
            name: None,
            street: None,
            street_number: None,
            post_code: Some(2000),
            region: None,
            country: None,
            handed_out: Some(false),
        };
        let (id, update) = args.into_parts();
        assert_eq!(id, "oJZWV");
        assert_eq!(update.post_code, Some(2000));
        assert_eq!(update.handed_out, Some(false));
        assert!(update.name.is_none());
    }
}
