use crate::component::release_namer::{
    EPISODE_PLACEHOLDER, EpisodeMode, NameOverrides, expand_batch_template,
};
use crate::component::release_pipeline::{
    NameOutput, PipelineOutcome, PreparedRelease, ReleasePipeline, ReleaseRequest, RunMode,
};
use crate::config::Config;
use crate::config::save::add_recent_path;
use crate::pause;
use crate::tools::validate_path_exists;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::warn;
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_prepare_release(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    println!("{}", style(t!("prepare.title")).cyan().bold());

    if let Some(request) = prompt_request(term, config, RunMode::Full)? {
        let pipeline = ReleasePipeline::new(&config.settings, Arc::clone(shutdown_signal))
            .with_progress(true);
        run_pipeline(&pipeline, &request, config);
    }

    pause(term)?;
    Ok(())
}

pub fn run_name_only(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    println!("{}", style(t!("name_only.title")).cyan().bold());

    let outputs = [NameOutput::SideChannel, NameOutput::Rename];
    let items = vec![t!("name_only.opt_side_channel"), t!("name_only.opt_rename")];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("name_only.prompt_output"))
        .items(&items)
        .default(0)
        .interact_on_opt(term)?;
    let Some(selection) = selection else {
        return Ok(());
    };

    if let Some(request) = prompt_request(term, config, RunMode::NameOnly(outputs[selection]))? {
        let pipeline = ReleasePipeline::new(&config.settings, Arc::clone(shutdown_signal));
        run_pipeline(&pipeline, &request, config);
    }

    pause(term)?;
    Ok(())
}

fn run_pipeline(pipeline: &ReleasePipeline, request: &ReleaseRequest, config: &Config) {
    match pipeline.prepare_artifacts(request) {
        Ok(PipelineOutcome::NameOnly { name, written }) => {
            println!("\n{} {}", style(t!("result.name")).green(), style(&name).bold());
            println!("{} {}", style(t!("result.written")).dim(), written.display());
        }
        Ok(PipelineOutcome::Prepared(release)) => print_release(&release, config),
        Err(e) => {
            warn!("準備失敗: {e}");
            eprintln!("{} {}", style(t!("common.error")).red().bold(), e);
        }
    }
}

fn print_release(release: &PreparedRelease, config: &Config) {
    println!(
        "\n{} {}",
        style(t!("result.name")).green(),
        style(&release.name).bold()
    );

    if release.name.contains(EPISODE_PLACEHOLDER) {
        let layout = expand_batch_template(&release.name);
        println!("{} {}", style(t!("result.batch_directory")).dim(), layout.directory);
        println!("{} {}", style(t!("result.batch_pattern")).dim(), layout.file_pattern);
    }

    println!(
        "{} {}",
        style(t!("result.main_file")).dim(),
        release.main_file.path.display()
    );

    let Some(set) = &release.screenshots else {
        println!("{}", style(t!("result.no_screenshots")).yellow());
        return;
    };

    println!(
        "{} {}",
        style(t!("result.screenshot_dir")).dim(),
        set.directory.display()
    );
    let hosting = config.settings.screenshot.image_hosting;
    for image in &set.images {
        match set.uploaded_url(image, hosting) {
            Some(url) => println!("  {} -> {url}", image.display()),
            None => println!("  {}", image.display()),
        }
    }
}

/// 詢問目標路徑、中繼資料識別碼與命名覆寫
fn prompt_request(term: &Term, config: &mut Config, mode: RunMode) -> Result<Option<ReleaseRequest>> {
    let Some(target) = prompt_target_path(term, config)? else {
        return Ok(None);
    };

    let identifier: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prepare.prompt_identifier"))
        .interact_text_on(term)?;

    let overrides = prompt_overrides(term)?;

    Ok(Some(ReleaseRequest {
        target,
        identifier: identifier.trim().to_string(),
        overrides,
        mode,
    }))
}

fn prompt_target_path(term: &Term, config: &mut Config) -> Result<Option<PathBuf>> {
    let recent = config.settings.recent_paths.clone();

    let path = if recent.is_empty() {
        prompt_new_path(term)?
    } else {
        let mut items = recent.clone();
        items.push(t!("prepare.opt_new_path").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("prepare.prompt_recent"))
            .items(&items)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            None => return Ok(None),
            Some(i) if i < recent.len() => recent[i].clone(),
            Some(_) => prompt_new_path(term)?,
        }
    };

    let target = PathBuf::from(&path);
    validate_path_exists(&target)?;

    add_recent_path(&mut config.settings, &path);
    if let Err(e) = config.save() {
        warn!("無法儲存最近使用路徑: {e:#}");
    }

    Ok(Some(target))
}

fn prompt_new_path(term: &Term) -> Result<String> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prepare.prompt_path"))
        .interact_text_on(term)?;
    Ok(path.trim().to_string())
}

fn prompt_optional(term: &Term, prompt: impl Into<String>) -> Result<Option<String>> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text_on(term)?;
    let value = value.trim().to_string();
    Ok((!value.is_empty()).then_some(value))
}

fn prompt_overrides(term: &Term) -> Result<NameOverrides> {
    let alternate_name = prompt_optional(term, t!("prepare.prompt_alternate"))?;
    let season = prompt_optional(term, t!("prepare.prompt_season"))?;

    let batch = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prepare.prompt_batch"))
        .default(false)
        .interact_on(term)?;

    let (episode, episode_mode) = if batch {
        (None, EpisodeMode::BatchPlaceholder)
    } else {
        (
            prompt_optional(term, t!("prepare.prompt_episode"))?,
            EpisodeMode::Explicit,
        )
    };

    Ok(NameOverrides {
        alternate_name,
        season,
        episode,
        episode_mode,
    })
}
