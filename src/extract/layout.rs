// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Site layout extraction
//!
//! `SiteExtractor` is the contract between the orchestrator and one site's
//! markup. Every method is a pure mapping from page text to records. A record
//! that does not match the expected shape is skipped; a missing optional field
//! becomes [`UNKNOWN`].

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::types::{DetailPage, EpisodeRecord, ItemRecord, SeasonRef, SectionRecord, UNKNOWN};
use super::urls::{upgrade_protocol_relative, SiteOrigin};
use crate::fetch::FetchError;

/// Trait for a site's markup rules
pub trait SiteExtractor: Send + Sync {
    /// Named sections of the home page, each with its items
    fn home_sections(&self, html: &str) -> Vec<SectionRecord>;

    /// Results listed on a search page
    fn search_results(&self, html: &str) -> Vec<ItemRecord>;

    /// Title, poster, languages and season selectors of a detail page
    fn detail_page(&self, html: &str) -> DetailPage;

    /// Episodes contained in one season fragment
    fn season_episodes(&self, fragment: &str) -> Vec<EpisodeRecord>;

    /// URL of the search page for `query`
    fn search_url(&self, query: &str) -> Result<String, FetchError>;

    /// URL returning the episode fragment of one season
    fn season_url(&self, season: &SeasonRef) -> Result<String, FetchError>;

    /// Site path of the page carrying an episode's or movie's player
    fn stream_path(&self, path: &str) -> String;

    /// Name for logging
    fn name(&self) -> &'static str;
}

/// Markup rules for the animesalt layout
pub struct AnimeSaltLayout {
    origin: SiteOrigin,
}

const CHART_SECTION_MARKER: &str = "Most-Watched";
const FRESH_DROPS_SECTION: &str = "Fresh Drops";
const WIDGET_CLASSES: [&str; 2] = ["widget_list_episodes", "widget_list_movies_series"];
const SEASON_ENDPOINT: &str = "/wp-admin/admin-ajax.php";
const SEASON_ACTION: &str = "action_select_season";

impl AnimeSaltLayout {
    pub fn new(origin: SiteOrigin) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> &SiteOrigin {
        &self.origin
    }

    fn chart_sections(&self, document: &Html, sections: &mut Vec<SectionRecord>) {
        for heading in select_all(document.root_element(), "h3.section-title") {
            let name = text_of(heading);
            if !name.contains(CHART_SECTION_MARKER) {
                continue;
            }

            let items = following_sibling(heading, "div", Some("aa-cn"))
                .and_then(|container| select_first(container, "div.chart-content"))
                .map(|chart| {
                    select_all(chart, "div.chart-item")
                        .into_iter()
                        .filter_map(|item| self.chart_item(item))
                        .collect()
                })
                .unwrap_or_default();

            push_section(sections, name, items);
        }
    }

    fn chart_item(&self, item: ElementRef) -> Option<ItemRecord> {
        let title = select_first(item, "div.chart-title").map(text_of)?;
        let link = select_first(item, "a.chart-poster").and_then(|a| attr(a, "href"))?;
        let image = select_first(item, "img").and_then(|img| attr(img, "data-src"))?;

        Some(ItemRecord::new(
            title,
            self.origin.strip(&link),
            upgrade_protocol_relative(&image),
        ))
    }

    fn widget_sections(&self, document: &Html, sections: &mut Vec<SectionRecord>) {
        let widgets = select_all(document.root_element(), "section")
            .into_iter()
            .filter(|section| {
                section
                    .value()
                    .classes()
                    .any(|class| WIDGET_CLASSES.iter().any(|w| class.contains(w)))
            });

        for widget in widgets {
            let Some(name) = select_first(widget, "h3.section-title").map(text_of) else {
                continue;
            };
            let with_episodes = name == FRESH_DROPS_SECTION;

            let items = select_first(widget, "div.swiper-wrapper")
                .map(|wrapper| {
                    select_all(wrapper, "div.swiper-slide")
                        .into_iter()
                        .filter_map(|slide| select_first(slide, "li"))
                        .filter_map(|entry| self.slide_item(entry, with_episodes))
                        .collect()
                })
                .unwrap_or_default();

            push_section(sections, name, items);
        }
    }

    fn slide_item(&self, entry: ElementRef, with_episodes: bool) -> Option<ItemRecord> {
        let title = select_first(entry, "h2.entry-title").map(text_of)?;
        let link = select_first(entry, "a.lnk-blk")
            .and_then(|a| attr(a, "href"))
            .map(|href| self.origin.strip(&href))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let image = select_first(entry, "img")
            .and_then(|img| attr(img, "data-src"))
            .map(|src| upgrade_protocol_relative(&src))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let mut item = ItemRecord::new(title, link, image);
        if with_episodes {
            let episodes = select_first(entry, "span.year")
                .map(text_of)
                .unwrap_or_else(|| UNKNOWN.to_string());
            item = item.with_extra("episodes", episodes);
        }
        Some(item)
    }

    fn search_item(&self, entry: ElementRef) -> ItemRecord {
        let title = select_first(entry, "h2.entry-title")
            .map(text_of)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let link = select_first(entry, "a.lnk-blk")
            .and_then(|a| attr(a, "href"))
            .map(|href| self.origin.strip(&href))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let image = select_first(entry, ".post-thumbnail img")
            .and_then(|img| attr(img, "data-src"))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let categories: Vec<&str> = entry
            .value()
            .classes()
            .filter_map(|class| class.strip_prefix("category-"))
            .collect();
        let categories = if categories.is_empty() {
            UNKNOWN.to_string()
        } else {
            categories.join(", ")
        };

        ItemRecord::new(title, link, image).with_extra("categories", categories)
    }

    fn episode(&self, entry: ElementRef) -> Option<EpisodeRecord> {
        let href = select_first(entry, "a.lnk-blk").and_then(|a| attr(a, "href"))?;

        let number = select_first(entry, "span.num-epi")
            .map(text_of)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let title = select_first(entry, "h2.entry-title")
            .map(text_of)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let image_url = select_first(entry, "div.post-thumbnail")
            .and_then(|thumb| select_first(thumb, "img"))
            .and_then(|img| attr(img, "data-src").or_else(|| attr(img, "src")))
            .map(|src| upgrade_protocol_relative(&src))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(EpisodeRecord {
            number,
            title,
            relative_url: self.origin.strip(&self.origin.absolute(&href)),
            image_url,
        })
    }
}

impl SiteExtractor for AnimeSaltLayout {
    fn home_sections(&self, html: &str) -> Vec<SectionRecord> {
        let document = Html::parse_document(html);
        let mut sections = Vec::new();
        self.chart_sections(&document, &mut sections);
        self.widget_sections(&document, &mut sections);
        sections
    }

    fn search_results(&self, html: &str) -> Vec<ItemRecord> {
        let document = Html::parse_document(html);
        select_all(document.root_element(), "ul.post-lst > li")
            .into_iter()
            .map(|entry| self.search_item(entry))
            .collect()
    }

    fn detail_page(&self, html: &str) -> DetailPage {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let title = select_first(root, "h1")
            .map(text_of)
            .unwrap_or_else(|| UNKNOWN.to_string());
        let image_url = select_first(root, r#"meta[property="og:image"]"#)
            .and_then(|meta| attr(meta, "content"))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let languages = select_all(root, "h4")
            .into_iter()
            .find(|h4| text_of(*h4).to_lowercase().contains("languages"))
            .and_then(|h4| following_sibling(h4, "div", None))
            .map(|list| {
                select_all(list, "a")
                    .into_iter()
                    .map(text_of)
                    .filter(|lang| !lang.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let buttons = select_all(root, "a.season-btn");
        let seasons = buttons
            .iter()
            .filter_map(|button| {
                Some(SeasonRef {
                    post_id: attr(*button, "data-post")?,
                    season: attr(*button, "data-season")?,
                })
            })
            .collect();

        DetailPage {
            title,
            image_url,
            languages,
            season_buttons: buttons.len(),
            seasons,
        }
    }

    fn season_episodes(&self, fragment: &str) -> Vec<EpisodeRecord> {
        let document = Html::parse_fragment(fragment);
        select_all(document.root_element(), "li")
            .into_iter()
            .filter_map(|entry| self.episode(entry))
            .collect()
    }

    fn search_url(&self, query: &str) -> Result<String, FetchError> {
        let mut url = self.origin.url().clone();
        url.set_path("/");
        url.query_pairs_mut().clear().append_pair("s", query);
        Ok(url.to_string())
    }

    fn season_url(&self, season: &SeasonRef) -> Result<String, FetchError> {
        let endpoint = self.origin.absolute(SEASON_ENDPOINT);
        Url::parse_with_params(
            &endpoint,
            &[
                ("action", SEASON_ACTION),
                ("season", season.season.as_str()),
                ("post", season.post_id.as_str()),
            ],
        )
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }

    fn stream_path(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.starts_with("movies/") || path.starts_with("episode/") {
            path.to_string()
        } else {
            format!("episode/{}", path)
        }
    }

    fn name(&self) -> &'static str {
        "animesalt"
    }
}

/// Whitespace-normalized text content of an element
pub fn text_of(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty attribute value
fn attr(element: ElementRef, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    let found = scope.select(&selector).collect();
    found
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    let found = scope.select(&selector).next();
    found
}

/// First following sibling element with the given tag (and class)
fn following_sibling<'a>(
    element: ElementRef<'a>,
    tag: &str,
    class: Option<&str>,
) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| {
            sibling.value().name() == tag
                && class.map_or(true, |c| sibling.value().classes().any(|have| have == c))
        })
}

/// Add a section unless it is empty; a repeated name replaces the earlier items
fn push_section(sections: &mut Vec<SectionRecord>, name: String, items: Vec<ItemRecord>) {
    if items.is_empty() {
        return;
    }
    match sections.iter_mut().find(|section| section.name == name) {
        Some(existing) => existing.items = items,
        None => sections.push(SectionRecord { name, items }),
    }
}
