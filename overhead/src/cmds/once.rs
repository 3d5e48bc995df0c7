//! `once`: a single poll, printed as a table.
//!

use eyre::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{info, trace};

use overhead_common::BB;
use overhead_sources::PositionSource;

use crate::{compass, format_altitude, format_speed, within_radius, Context};

/// Fetch what is around right now, closest first.
///
#[tracing::instrument(skip(ctx))]
pub fn list_once(ctx: &Context) -> Result<String> {
    trace!("list_once");

    let bb = BB::from_position(&ctx.center, ctx.radius);
    let list = ctx.site.fetch(&bb, &ctx.credential.token)?;
    let in_range = within_radius(list.states.unwrap_or_default(), &ctx.center, ctx.radius);
    info!("{} aircraft within {} km", in_range.len(), ctx.radius);

    let header = vec!["Distance", "Callsign", "Aircraft", "Altitude", "Speed", "Heading"];

    let mut builder = Builder::default();
    builder.push_record(header);

    in_range.iter().for_each(|(s, dist)| {
        let plane = ctx.enricher.enrich(s, *dist);

        let row = vec![
            format!("{dist:.1} km"),
            plane.callsign().to_string(),
            plane.title.clone(),
            format_altitude(s.altitude_m, s.on_ground),
            format_speed(s.velocity_mps).unwrap_or_default(),
            s.heading_degrees.map(compass).unwrap_or_default().to_string(),
        ];
        builder.push_record(row);
    });

    let table = builder.build().with(Style::rounded()).to_string();
    Ok(format!(
        "Aircraft within {} km of {}:\n{table}",
        ctx.radius, ctx.center
    ))
}
