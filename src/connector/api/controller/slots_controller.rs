use anyhow::Result;
use chrono::Utc;

use crate::cli::SelectionArgs;

use super::super::Container;
use super::select_through_slots;

pub struct SlotsController<'a> {
    container: &'a Container,
}

impl<'a> SlotsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn slots(&self, args: SelectionArgs) -> Result<String> {
        let (resolver, _ctx) = select_through_slots(self.container, &args, Utc::now()).await?;

        let (Some(business), Some(worker), Some(date), Some(slots)) = (
            resolver.business(),
            resolver.worker(),
            resolver.selection().date(),
            resolver.offered_slots(),
        ) else {
            anyhow::bail!("selection is incomplete");
        };

        if slots.is_empty() {
            return Ok(format!(
                "No open slots for {} on {}.",
                worker.name(),
                date
            ));
        }

        let tz = business.timezone();
        let mut output = format!(
            "Open slots for {} at {} on {} ({}):\n\n",
            worker.name(),
            business.name(),
            date,
            tz
        );
        let times: Vec<String> = slots
            .iter()
            .map(|slot| slot.start().with_timezone(&tz).format("%H:%M").to_string())
            .collect();
        for row in times.chunks(8) {
            output.push_str(&format!("  {}\n", row.join("  ")));
        }
        Ok(output)
    }
}
