use crate::infra::{build_session, load_saved_outfits, load_wardrobe, parse_style, MemorySession};
use clap::Args;
use std::path::PathBuf;
use wardrobe_ai::config::OutfitConfig;
use wardrobe_ai::error::AppError;
use wardrobe_ai::workflows::outfits::service::EXHAUSTED_MESSAGE;
use wardrobe_ai::workflows::outfits::{
    Category, Disposition, DispositionPrompt, GeneratedOutfit, PromptOutcome, RejectOutcome,
    ScoringEngine, SessionError, SimilarityMatrix, Step, Style, WardrobeItem,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Style to generate outfits for
    #[arg(long, value_parser = parse_style, default_value = "casual")]
    pub(crate) style: Style,
    /// Wardrobe export (CSV or JSON). Defaults to the bundled sample wardrobe.
    #[arg(long)]
    pub(crate) wardrobe: Option<PathBuf>,
    /// Saved-outfit JSON document; those combinations are skipped.
    #[arg(long)]
    pub(crate) saved: Option<PathBuf>,
    /// Number of outfits to step through before rejecting and saving
    #[arg(long, default_value_t = 5)]
    pub(crate) steps: usize,
    /// Seed for the Random style
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Name to save the final outfit under
    #[arg(long, default_value = "Demo look")]
    pub(crate) save_as: String,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Style whose color rule scores the items
    #[arg(long, value_parser = parse_style)]
    pub(crate) style: Style,
    /// Wardrobe export (CSV or JSON). Defaults to the bundled sample wardrobe.
    #[arg(long)]
    pub(crate) wardrobe: Option<PathBuf>,
    /// Seed for the Random style
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

fn demo_config(seed: Option<u64>) -> OutfitConfig {
    OutfitConfig {
        random_seed: seed,
        ..OutfitConfig::default()
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        style,
        wardrobe,
        saved,
        steps,
        seed,
        save_as,
    } = args;

    let config = demo_config(seed);
    let items = load_wardrobe(wardrobe.as_deref())?;
    let saved = load_saved_outfits(saved.as_deref())?;
    let mut session = build_session(items, saved, &config);

    println!("Outfit engine demo: {}", style.label());
    println!("Rule: {}", style.color_rule_description());
    let count = session.load_wardrobe().await?;
    println!("Wardrobe: {count} ({} combinations)", count.combinations());

    let first = session.start(style).await?;
    render_rankings(&session, style);

    println!("\nOutfits");
    render_step(1, &first);
    for index in 2..=steps {
        let step = session.next().await?;
        render_step(index, &step);
        if step.is_exhausted() {
            break;
        }
    }

    println!("\nRejecting the current outfit");
    match session.reject().await? {
        RejectOutcome::Advanced { step } => render_step(steps.max(1) + 1, &step),
        RejectOutcome::Prompt { prompt } => {
            render_prompt(&prompt);
            let step = keep_pending_items(&mut session).await?;
            render_step(steps.max(1) + 1, &step);
        }
    }

    println!("\nLocking every slot");
    for slot in Category::ordered() {
        let toggle = session.toggle_lock(slot)?;
        println!(
            "- {} locked (ready to save: {})",
            toggle.slot,
            if toggle.ready_to_save { "yes" } else { "no" }
        );
    }

    match session.save(&save_as).await {
        Ok(outfit) => {
            println!("\nSaved {}", outfit.created_at.format("%Y-%m-%d %H:%M UTC"));
            println!("{}", outfit.share_summary());
        }
        Err(SessionError::Store(err)) => println!("\nSave skipped: {err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        style,
        wardrobe,
        seed,
    } = args;

    let items = load_wardrobe(wardrobe.as_deref())?;
    let mut engine = ScoringEngine::new(demo_config(seed).scoring());

    println!("{} scores", style.label());
    println!("Rule: {}", style.color_rule_description());

    if style == Style::Sandwich {
        let tops = of_category(&items, Category::Top);
        let bottoms = of_category(&items, Category::Bottom);
        let shoes = of_category(&items, Category::Shoes);
        let matrix = SimilarityMatrix::build(&items);

        println!("\nTop/shoe pairs");
        for pair in engine.rank_sandwich_pairs(&tops, &shoes, &matrix) {
            let bottom = engine
                .best_bottom(&bottoms, &pair)
                .map(|bottom| format!("{} ({:.1})", bottom.item.brand, bottom.score))
                .unwrap_or_else(|| "no bottoms".to_string());
            println!(
                "- {:>5.1}  {} + {} | best bottom: {}",
                pair.score, pair.top.item.brand, pair.shoes.item.brand, bottom
            );
        }
        return Ok(());
    }

    for slot in Category::ordered() {
        println!("\n{}", slot.export_label());
        for entry in engine.rank_category(style, &of_category(&items, slot)) {
            println!("- {:>5.1}  {} ({})", entry.score, entry.item.brand, entry.url());
        }
    }

    Ok(())
}

async fn keep_pending_items(session: &mut MemorySession) -> Result<Step, AppError> {
    let mut outcome = session.resolve_prompt(Disposition::Keep).await?;
    loop {
        match outcome {
            // Donate leaves the prompt open, so it is answered with Keep as well.
            PromptOutcome::NextPrompt { prompt } | PromptOutcome::Donate { prompt, .. } => {
                render_prompt(&prompt);
                outcome = session.resolve_prompt(Disposition::Keep).await?;
            }
            PromptOutcome::Resumed { step } => return Ok(step),
        }
    }
}

fn render_rankings(session: &MemorySession, style: Style) {
    if style == Style::Sandwich {
        println!("\nBest top/shoe pairs");
        for pair in session.sandwich_pairs().unwrap_or_default().iter().take(5) {
            println!(
                "- {:>5.1}  {} + {}",
                pair.score, pair.top.item.brand, pair.shoes.item.brand
            );
        }
        return;
    }

    for slot in Category::ordered() {
        println!("\n{} ranking", slot.export_label());
        for entry in session.ranking(slot).unwrap_or_default() {
            println!("- {:>5.1}  {}", entry.score, entry.item.brand);
        }
    }
}

fn render_step(index: usize, step: &Step) {
    println!(
        "{index}. {} (score {:.1})",
        describe(&step.outfit),
        step.outfit.overall_score()
    );
    if step.is_exhausted() {
        println!("   {EXHAUSTED_MESSAGE}");
    }
}

fn render_prompt(prompt: &DispositionPrompt) {
    println!(
        "- {} from {} rejected {} times; keeping it",
        prompt.slot, prompt.item.brand, prompt.rejection_count
    );
}

fn describe(outfit: &GeneratedOutfit) -> String {
    Category::ordered()
        .into_iter()
        .map(|slot| {
            let brand = outfit
                .item(slot)
                .map(|entry| entry.item.brand.as_str())
                .unwrap_or("-");
            if outfit.is_locked(slot) {
                format!("{brand} [locked]")
            } else {
                brand.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

fn of_category(items: &[WardrobeItem], category: Category) -> Vec<WardrobeItem> {
    items
        .iter()
        .filter(|item| item.category == category)
        .cloned()
        .collect()
}
