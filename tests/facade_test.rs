//! End-to-end use through the facade crate

use pagetree::cache::InMemoryCache;
use pagetree::conf::CmsSettings;
use pagetree::prelude::*;
use pagetree::tree::TreeProblem;
use std::sync::Arc;

const SETTINGS: &str = r#"
site_id = 1
permission = true

[cache_durations]
permissions = 600

[[languages.sites]]
site = 1

[[languages.sites.languages]]
code = "en"
name = "English"

[[languages.sites.languages]]
code = "de"
name = "Deutsch"
fallbacks = ["en"]
hide_untranslated = false
"#;

#[tokio::test]
async fn test_configured_site_end_to_end() {
	// Arrange
	let settings = CmsSettings::from_toml_str(SETTINGS).unwrap();
	let cms = Cms::with_cache(settings, Arc::new(InMemoryCache::new())).unwrap();
	let admin = User::new(1, "admin").superuser();
	let editor = cms
		.permissions()
		.add_user(User::new(2, "editor").with_permissions(["cms.change_page", "cms.change_pagecontent"]))
		.await
		.unwrap();

	// Act
	let company = cms.create_page_as(&admin, CreatePage::new("Company", "en")).await.unwrap();
	let jobs = cms
		.create_page_as(&admin, CreatePage::new("Jobs", "en").under(company.id))
		.await
		.unwrap();
	cms.pages()
		.add_translation(jobs.id, "de", "Stellen", None, "admin")
		.await
		.unwrap();
	cms.grant_page_permission_as(
		&admin,
		company.id,
		Principal::User(editor.id),
		GrantOn::PAGE_AND_DESCENDANTS,
		PermissionFlags::change_only(),
	)
	.await
	.unwrap();
	cms.update_slug_as(&editor, jobs.id, "de", "karriere").await.unwrap();
	let denied = cms.delete_page_as(&editor, jobs.id).await;

	// Assert
	let jobs = cms.pages().get_page(jobs.id).await.unwrap();
	assert_eq!(
		cms.pages().get_absolute_url(&jobs, "de").await.unwrap().as_deref(),
		Some("/de/company/karriere/")
	);
	assert!(matches!(denied, Err(CmsError::PermissionDenied { .. })));
	let menu = cms.menu_nodes(1, "de", &editor).await.unwrap();
	assert_eq!(menu[0].children[0].title, "Stellen");
	let problems: Vec<TreeProblem> = cms.store().read().await.nodes.check_integrity();
	assert!(problems.is_empty());
	assert!(cms.fix_tree().await.unwrap().is_clean());
}
