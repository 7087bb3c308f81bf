//! Navigation menus

use pagetree_cms::prelude::*;
use pagetree_conf::{CmsSettings, Language};
use rstest::{fixture, rstest};

fn settings() -> CmsSettings {
	let mut settings = CmsSettings::default();
	settings.languages.available = vec![Language::new("en", "English"), Language::new("de", "Deutsch")];
	settings
}

#[fixture]
fn cms() -> Cms {
	Cms::new(settings()).unwrap()
}

fn titles(nodes: &[MenuNode]) -> Vec<String> {
	nodes
		.iter()
		.flat_map(|node| node.flatten())
		.map(|node| node.title.clone())
		.collect()
}

#[rstest]
#[tokio::test]
async fn test_menu_follows_tree(cms: Cms) {
	// Arrange
	let pages = cms.pages();
	let home = pages.create_page(CreatePage::new("Home", "en")).await.unwrap();
	pages.set_as_homepage(home.id, "admin").await.unwrap();
	let about = pages
		.create_page(CreatePage::new("About", "en").under(home.id).menu_title("About us"))
		.await
		.unwrap();
	pages
		.create_page(CreatePage::new("Team", "en").under(about.id))
		.await
		.unwrap();

	// Act
	let menu = cms.menu_nodes(1, "en", &User::anonymous()).await.unwrap();

	// Assert
	assert_eq!(menu.len(), 1);
	assert_eq!(menu[0].url, "/en/");
	assert_eq!(menu[0].children[0].title, "About us");
	assert_eq!(menu[0].children[0].url, "/en/about/");
	assert_eq!(menu[0].children[0].children[0].url, "/en/about/team/");
	assert_eq!(titles(&menu), vec!["Home", "About us", "Team"]);
}

#[rstest]
#[tokio::test]
async fn test_hidden_page_hides_its_subtree(cms: Cms) {
	// Arrange
	let pages = cms.pages();
	let root = pages.create_page(CreatePage::new("Root", "en")).await.unwrap();
	let hidden = pages
		.create_page(CreatePage::new("Hidden", "en").under(root.id).in_navigation(false))
		.await
		.unwrap();
	pages
		.create_page(CreatePage::new("Below", "en").under(hidden.id))
		.await
		.unwrap();
	pages
		.create_page(CreatePage::new("Shown", "en").under(root.id))
		.await
		.unwrap();

	// Act
	let menu = cms.menu_nodes(1, "en", &User::anonymous()).await.unwrap();

	// Assert
	assert_eq!(titles(&menu), vec!["Root", "Shown"]);
}

#[rstest]
#[case::anonymous(User::anonymous(), vec!["Public", "Guests"])]
#[case::member(User::new(5, "member"), vec!["Public", "Members"])]
#[tokio::test]
async fn test_limit_visibility(cms: Cms, #[case] user: User, #[case] expected: Vec<&str>) {
	// Arrange
	let pages = cms.pages();
	pages.create_page(CreatePage::new("Public", "en")).await.unwrap();
	pages
		.create_page(CreatePage::new("Members", "en").limit_visibility(LimitVisibility::ForAuthenticated))
		.await
		.unwrap();
	pages
		.create_page(CreatePage::new("Guests", "en").limit_visibility(LimitVisibility::ForAnonymous))
		.await
		.unwrap();

	// Act
	let menu = cms.menu_nodes(1, "en", &user).await.unwrap();

	// Assert
	assert_eq!(titles(&menu), expected);
}

#[rstest]
#[tokio::test]
async fn test_view_restricted_pages_need_view_rights() {
	// Arrange
	let cms = Cms::new(CmsSettings {
		permission: true,
		..settings()
	})
	.unwrap();
	let pages = cms.pages();
	pages.create_page(CreatePage::new("Open", "en")).await.unwrap();
	let secret = pages.create_page(CreatePage::new("Secret", "en")).await.unwrap();
	let viewer = cms.permissions().add_user(User::new(7, "viewer")).await.unwrap();
	cms.permissions()
		.grant_page_permission(
			secret.id,
			Principal::User(viewer.id),
			GrantOn::PAGE_AND_DESCENDANTS,
			PermissionFlags::view_only(),
		)
		.await
		.unwrap();

	// Act
	let anonymous = cms.menu_nodes(1, "en", &User::anonymous()).await.unwrap();
	let granted = cms.menu_nodes(1, "en", &viewer).await.unwrap();

	// Assert
	assert_eq!(titles(&anonymous), vec!["Open"]);
	assert_eq!(titles(&granted), vec!["Open", "Secret"]);
}

#[rstest]
#[tokio::test]
async fn test_page_mutations_refresh_cached_menu(cms: Cms) {
	// Arrange
	let pages = cms.pages();
	let first = pages.create_page(CreatePage::new("First", "en")).await.unwrap();
	let before = cms.menu_nodes(1, "en", &User::anonymous()).await.unwrap();

	// Act
	pages.create_page(CreatePage::new("Second", "en")).await.unwrap();
	pages
		.update_slug(first.id, "en", "renamed", "admin")
		.await
		.unwrap();
	let after = cms.menu_nodes(1, "en", &User::anonymous()).await.unwrap();

	// Assert
	assert_eq!(titles(&before), vec!["First"]);
	assert_eq!(titles(&after), vec!["First", "Second"]);
	assert_eq!(after[0].url, "/en/renamed/");
}

#[rstest]
#[case::hidden(true, vec![])]
#[case::fallback(false, vec!["/de/about/"])]
#[tokio::test]
async fn test_untranslated_pages(#[case] hide_untranslated: bool, #[case] expected: Vec<&str>) {
	// Arrange
	let mut settings = settings();
	settings.languages.defaults.hide_untranslated = hide_untranslated;
	let cms = Cms::new(settings).unwrap();
	cms.pages().create_page(CreatePage::new("About", "en")).await.unwrap();

	// Act
	let menu = cms.menu_nodes(1, "de", &User::anonymous()).await.unwrap();

	// Assert
	let urls: Vec<&str> = menu.iter().map(|node| node.url.as_str()).collect();
	assert_eq!(urls, expected);
	if let Some(node) = menu.first() {
		assert_eq!(node.language, "en");
	}
}
