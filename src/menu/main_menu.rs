use crate::component::screenshot_generator::MAX_SCREENSHOTS;
use crate::config::{CacheMatch, Config, ImageHosting, Language};
use crate::menu::handlers::{run_name_only, run_prepare_release};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_prepare"),
        t!("main_menu.opt_name_only"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_prepare_release(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_name_only(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_screenshot"),
            t!("settings.opt_naming"),
            t!("settings.opt_metadata"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_screenshot_settings_menu(term, config)?,
            Some(1) => show_naming_settings_menu(term, config)?,
            Some(2) => show_metadata_settings_menu(term, config)?,
            Some(3) => show_language_menu(term, config)?,
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn confirm_saved(config: &Config) -> Result<()> {
    config.save()?;
    println!("\n{}", style(t!("settings.saved")).green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}

/// 截圖設定選單
fn show_screenshot_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.screenshot.title")).cyan().bold());

    let current = config.settings.screenshot.clone();
    let theme = ColorfulTheme::default();

    let count: usize = Input::with_theme(&theme)
        .with_prompt(t!("settings.screenshot.prompt_count", max = MAX_SCREENSHOTS))
        .default(current.count)
        .validate_with(|n: &usize| {
            if *n <= MAX_SCREENSHOTS {
                Ok(())
            } else {
                Err(t!("settings.screenshot.count_invalid", max = MAX_SCREENSHOTS).to_string())
            }
        })
        .interact_text_on(term)?;

    let optimize = Confirm::with_theme(&theme)
        .with_prompt(t!("settings.screenshot.prompt_optimize"))
        .default(current.optimize)
        .interact_on(term)?;

    let workers: usize = Input::with_theme(&theme)
        .with_prompt(t!("settings.screenshot.prompt_workers"))
        .default(current.workers)
        .interact_text_on(term)?;

    let matches = [CacheMatch::FolderName, CacheMatch::Fingerprint];
    let match_items = vec![
        t!("settings.screenshot.match_folder_name"),
        t!("settings.screenshot.match_fingerprint"),
    ];
    let cache_match = Select::with_theme(&theme)
        .with_prompt(t!("settings.screenshot.prompt_match"))
        .items(&match_items)
        .default(matches.iter().position(|&m| m == current.cache_match).unwrap_or(0))
        .interact_on_opt(term)?
        .map_or(current.cache_match, |i| matches[i]);

    let hosting_items: Vec<&str> = ImageHosting::ALL.iter().map(|h| h.label()).collect();
    let image_hosting = Select::with_theme(&theme)
        .with_prompt(t!("settings.screenshot.prompt_hosting"))
        .items(&hosting_items)
        .default(
            ImageHosting::ALL
                .iter()
                .position(|&h| h == current.image_hosting)
                .unwrap_or(0),
        )
        .interact_on_opt(term)?
        .map_or(current.image_hosting, |i| ImageHosting::ALL[i]);

    let screenshot = &mut config.settings.screenshot;
    screenshot.count = count;
    screenshot.optimize = optimize;
    screenshot.workers = workers.max(1);
    screenshot.cache_match = cache_match;
    screenshot.image_hosting = image_hosting;

    if config.settings.screenshot != current {
        confirm_saved(config)?;
    }
    Ok(())
}

/// 命名設定選單
fn show_naming_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.naming.title")).cyan().bold());

    let current = config.settings.naming.clone();
    let theme = ColorfulTheme::default();

    let source_tag: String = Input::with_theme(&theme)
        .with_prompt(t!("settings.naming.prompt_source"))
        .default(current.source_tag.clone())
        .interact_text_on(term)?;

    let release_group: String = Input::with_theme(&theme)
        .with_prompt(t!("settings.naming.prompt_group"))
        .default(current.release_group.clone())
        .interact_text_on(term)?;

    let channel_layout = Confirm::with_theme(&theme)
        .with_prompt(t!("settings.naming.prompt_layout"))
        .default(current.channel_layout)
        .interact_on(term)?;

    let naming = &mut config.settings.naming;
    naming.source_tag = source_tag.trim().to_string();
    naming.release_group = release_group.trim().to_string();
    naming.channel_layout = channel_layout;

    if config.settings.naming != current {
        confirm_saved(config)?;
    }
    Ok(())
}

/// 中繼資料設定選單
fn show_metadata_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;
    println!("{}", style(t!("settings.metadata.title")).cyan().bold());

    let retry: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.metadata.prompt_retry"))
        .default(config.settings.metadata.retry)
        .interact_text_on(term)?;

    if retry != config.settings.metadata.retry {
        config.settings.metadata.retry = retry;
        confirm_saved(config)?;
    }
    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        confirm_saved(config)?;
    }

    Ok(())
}
