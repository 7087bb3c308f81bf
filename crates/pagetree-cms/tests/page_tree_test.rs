//! Page tree operations and the URL paths they cascade

use pagetree_cms::prelude::*;
use pagetree_conf::{CmsSettings, Language, TemplateSetting};
use rstest::{fixture, rstest};

#[fixture]
fn cms() -> Cms {
	let mut settings = CmsSettings::default();
	settings.languages.available = vec![Language::new("en", "English"), Language::new("de", "Deutsch")];
	settings.templates.push(TemplateSetting::new("article.html", "Article"));
	Cms::new(settings).unwrap()
}

async fn path_of(cms: &Cms, page: PageId, language: &str) -> Option<String> {
	let page = cms.pages().get_page(page).await.unwrap();
	cms.pages().get_path(&page, language, false).await.unwrap()
}

async fn create(cms: &Cms, title: &str, parent: Option<PageId>) -> Page {
	let input = match parent {
		Some(parent) => CreatePage::new(title, "en").under(parent),
		None => CreatePage::new(title, "en"),
	};
	cms.pages().create_page(input).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_homepage_and_child_paths(cms: Cms) {
	// Arrange
	let home = create(&cms, "home", None).await;

	// Act
	cms.pages().set_as_homepage(home.id, "admin").await.unwrap();
	let about = create(&cms, "about", Some(home.id)).await;

	// Assert
	assert_eq!(path_of(&cms, home.id, "en").await.as_deref(), Some(""));
	assert_eq!(path_of(&cms, about.id, "en").await.as_deref(), Some("about"));
	let about = cms.pages().get_page(about.id).await.unwrap();
	assert_eq!(
		cms.pages().get_absolute_url(&about, "en").await.unwrap().as_deref(),
		Some("/en/about/")
	);
}

#[rstest]
#[tokio::test]
async fn test_duplicate_root_slug_cites_first_page(cms: Cms) {
	// Arrange
	let first = cms
		.pages()
		.create_page(CreatePage::new("Test page", "en").slug("test-page-1"))
		.await
		.unwrap();

	// Act
	let result = cms
		.pages()
		.create_page(CreatePage::new("Another", "en").slug("test-page-1"))
		.await;

	// Assert
	match result {
		Err(CmsError::Validation(ValidationError::PathCollision {
			conflicting_page,
			path,
			edit_url,
			..
		})) => {
			assert_eq!(conflicting_page, first.id);
			assert_eq!(path, "test-page-1");
			assert!(edit_url.contains(&first.id.to_string()));
		}
		other => panic!("expected a path collision, got {other:?}"),
	}
	assert_eq!(cms.pages().get_site_pages(1).await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_copy_subtree_under_other_root(cms: Cms) {
	// Arrange
	let a = create(&cms, "a", None).await;
	create(&cms, "a1", Some(a.id)).await;
	create(&cms, "a2", Some(a.id)).await;
	let b = create(&cms, "b", None).await;
	let b1 = create(&cms, "b1", Some(b.id)).await;

	// Act
	let copy = cms
		.pages()
		.copy_with_descendants(a.id, Some(b.node), Position::FirstChild, false, None, "admin")
		.await
		.unwrap();

	// Assert
	let descendants = cms.pages().get_descendants(b.id).await.unwrap();
	assert_eq!(descendants.len(), 4);
	let children = cms.pages().get_children(b.id).await.unwrap();
	assert_eq!(children.iter().map(|page| page.id).collect::<Vec<_>>(), vec![copy.id, b1.id]);
	assert_eq!(path_of(&cms, copy.id, "en").await.as_deref(), Some("b/a"));

	let copied_children = cms.pages().get_children(copy.id).await.unwrap();
	let mut paths = Vec::new();
	for child in &copied_children {
		paths.push(path_of(&cms, child.id, "en").await.unwrap());
	}
	assert_eq!(paths, vec!["b/a/a1", "b/a/a2"]);
	// the source subtree is untouched
	assert_eq!(cms.pages().get_descendants(a.id).await.unwrap().len(), 2);
	assert_eq!(path_of(&cms, a.id, "en").await.as_deref(), Some("a"));
}

#[rstest]
#[tokio::test]
async fn test_copy_subtree_into_itself(cms: Cms) {
	// Arrange
	let a = create(&cms, "a", None).await;
	let a1 = create(&cms, "a1", Some(a.id)).await;
	create(&cms, "a2", Some(a.id)).await;

	// Act
	let copy = cms
		.pages()
		.copy_with_descendants(a.id, Some(a1.node), Position::LastChild, false, None, "admin")
		.await
		.unwrap();

	// Assert
	let mut paths = vec![path_of(&cms, a.id, "en").await.unwrap()];
	for page in cms.pages().get_descendants(a.id).await.unwrap() {
		paths.push(path_of(&cms, page.id, "en").await.unwrap());
	}
	assert_eq!(paths, vec!["a", "a/a1", "a/a1/a", "a/a1/a/a1", "a/a1/a/a2", "a/a2"]);
	assert_eq!(cms.pages().get_descendants(copy.id).await.unwrap().len(), 2);
	assert!(cms.store().read().await.nodes.check_integrity().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_new_homepage_drops_prefix_and_old_one_regains_it(cms: Cms) {
	// Arrange
	let home = create(&cms, "home", None).await;
	cms.pages().set_as_homepage(home.id, "admin").await.unwrap();
	let about = create(&cms, "about", Some(home.id)).await;
	let p = create(&cms, "p", None).await;
	let x = create(&cms, "x", Some(p.id)).await;
	let y = create(&cms, "y", Some(x.id)).await;
	assert_eq!(path_of(&cms, y.id, "en").await.as_deref(), Some("p/x/y"));

	// Act
	let change = cms.pages().set_as_homepage(x.id, "admin").await.unwrap();

	// Assert
	assert_eq!(path_of(&cms, x.id, "en").await.as_deref(), Some(""));
	assert_eq!(path_of(&cms, y.id, "en").await.as_deref(), Some("y"));
	assert_eq!(path_of(&cms, home.id, "en").await.as_deref(), Some("home"));
	assert_eq!(path_of(&cms, about.id, "en").await.as_deref(), Some("home/about"));
	assert_eq!(path_of(&cms, p.id, "en").await.as_deref(), Some("p"));

	let new_tree: Vec<PageId> = change.new_home_tree.iter().map(|page| page.id).collect();
	let old_tree: Vec<PageId> = change.old_home_tree.iter().map(|page| page.id).collect();
	assert_eq!(new_tree, vec![x.id, y.id]);
	assert_eq!(old_tree, vec![home.id, about.id]);
	assert_eq!(cms.pages().get_home_page(1).await.map(|page| page.id), Some(x.id));
}

#[rstest]
#[tokio::test]
async fn test_setting_current_homepage_is_a_no_op(cms: Cms) {
	// Arrange
	let home = create(&cms, "home", None).await;
	cms.pages().set_as_homepage(home.id, "admin").await.unwrap();

	// Act
	let change = cms.pages().set_as_homepage(home.id, "admin").await.unwrap();

	// Assert
	assert!(change.is_empty());
	assert_eq!(path_of(&cms, home.id, "en").await.as_deref(), Some(""));
}

#[rstest]
#[tokio::test]
async fn test_move_cascades_to_descendants(cms: Cms) {
	// Arrange
	let about = create(&cms, "about", None).await;
	let p = create(&cms, "p", None).await;
	let x = create(&cms, "x", Some(p.id)).await;
	let y = create(&cms, "y", Some(x.id)).await;

	// Act
	cms.pages()
		.move_page(p.id, about.node, Position::LastChild, "admin")
		.await
		.unwrap();

	// Assert
	assert_eq!(path_of(&cms, p.id, "en").await.as_deref(), Some("about/p"));
	assert_eq!(path_of(&cms, x.id, "en").await.as_deref(), Some("about/p/x"));
	assert_eq!(path_of(&cms, y.id, "en").await.as_deref(), Some("about/p/x/y"));
	let parent = cms.pages().get_parent_page(p.id).await.unwrap();
	assert_eq!(parent.map(|page| page.id), Some(about.id));
}

#[rstest]
#[tokio::test]
async fn test_move_into_own_subtree_is_rejected(cms: Cms) {
	// Arrange
	let p = create(&cms, "p", None).await;
	let x = create(&cms, "x", Some(p.id)).await;

	// Act
	let result = cms
		.pages()
		.move_page(p.id, x.node, Position::LastChild, "admin")
		.await;

	// Assert
	assert!(matches!(result, Err(CmsError::InvalidMove(_))));
	assert_eq!(path_of(&cms, x.id, "en").await.as_deref(), Some("p/x"));
	assert!(cms.pages().get_parent_page(p.id).await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn test_move_to_root_pins_inherited_template(cms: Cms) {
	// Arrange
	let parent = cms
		.pages()
		.create_page(CreatePage::new("Blog", "en").template("article.html"))
		.await
		.unwrap();
	let child = create(&cms, "Post", Some(parent.id)).await;
	assert_eq!(cms.pages().get_template(child.id, "en").await.unwrap(), "article.html");

	// Act
	cms.pages()
		.move_page(child.id, parent.node, Position::Right, "admin")
		.await
		.unwrap();

	// Assert
	let content = cms.pages().get_content(child.id, "en", false).await.unwrap();
	assert_eq!(content.content().map(|content| content.template.as_str()), Some("article.html"));
	assert_eq!(path_of(&cms, child.id, "en").await.as_deref(), Some("post"));
}

#[rstest]
#[tokio::test]
async fn test_copy_renames_colliding_slugs(cms: Cms) {
	// Arrange
	let home = create(&cms, "home", None).await;
	let about = create(&cms, "about", Some(home.id)).await;
	let options = || CopyOptions {
		parent_node: Some(home.node),
		..CopyOptions::default()
	};

	// Act
	let first = cms.pages().copy(about.id, options()).await.unwrap();
	let second = cms.pages().copy(about.id, options()).await.unwrap();

	// Assert
	assert_eq!(path_of(&cms, first.id, "en").await.as_deref(), Some("home/about-copy"));
	assert_eq!(path_of(&cms, second.id, "en").await.as_deref(), Some("home/about-copy-2"));
	assert!(!first.is_home);
}

#[rstest]
#[tokio::test]
async fn test_copy_of_missing_translation_is_rejected(cms: Cms) {
	// Arrange
	let about = create(&cms, "about", None).await;
	let before = cms.store().read().await.nodes.len();

	// Act
	let result = cms
		.pages()
		.copy(
			about.id,
			CopyOptions {
				language: Some("de".to_string()),
				..CopyOptions::default()
			},
		)
		.await;

	// Assert
	match result {
		Err(CmsError::Validation(ValidationError::MissingLanguage { page, language })) => {
			assert_eq!(page, about.id);
			assert_eq!(language, "de");
		}
		other => panic!("expected missing language, got {other:?}"),
	}
	let tx = cms.store().read().await;
	assert_eq!(tx.nodes.len(), before);
	assert_eq!(tx.pages().count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_slug_change_cascades_through_fallback(cms: Cms) {
	// Arrange
	let news = create(&cms, "news", None).await;
	let year = cms
		.pages()
		.create_page(CreatePage::new("2024", "de").under(news.id))
		.await
		.unwrap();
	assert_eq!(path_of(&cms, year.id, "de").await.as_deref(), Some("news/2024"));

	// Act
	cms.pages().update_slug(news.id, "en", "press", "admin").await.unwrap();

	// Assert
	assert_eq!(path_of(&cms, news.id, "en").await.as_deref(), Some("press"));
	assert_eq!(path_of(&cms, year.id, "de").await.as_deref(), Some("press/2024"));
}

#[rstest]
#[tokio::test]
async fn test_delete_removes_subtree_rows(cms: Cms) {
	// Arrange
	let p = create(&cms, "p", None).await;
	let x = create(&cms, "x", Some(p.id)).await;
	let other = create(&cms, "other", None).await;

	// Act
	let mut removed = cms.pages().delete(p.id).await.unwrap();

	// Assert
	removed.sort_unstable();
	assert_eq!(removed, vec![p.id, x.id]);
	assert!(matches!(
		cms.pages().get_page(x.id).await,
		Err(CmsError::NotFound { kind: "page", .. })
	));
	let tx = cms.store().read().await;
	assert!(tx.urls_of(x.id).next().is_none());
	assert!(tx.contents_of(p.id).next().is_none());
	assert_eq!(tx.site_pages(1).len(), 1);
	assert_eq!(tx.site_pages(1)[0].id, other.id);
}

#[rstest]
#[tokio::test]
async fn test_last_translation_cannot_be_deleted(cms: Cms) {
	// Arrange
	let page = create(&cms, "page", None).await;
	cms.pages()
		.add_translation(page.id, "de", "Seite", None, "admin")
		.await
		.unwrap();

	// Act
	cms.pages().delete_translation(page.id, "en", "admin").await.unwrap();
	let result = cms.pages().delete_translation(page.id, "de", "admin").await;

	// Assert
	assert!(matches!(
		result,
		Err(CmsError::Validation(ValidationError::LastTranslation { .. }))
	));
	let page = cms.pages().get_page(page.id).await.unwrap();
	assert_eq!(page.get_languages(), vec!["de".to_string()]);
}

#[rstest]
#[tokio::test]
async fn test_reverse_id_lookup_and_uniqueness(cms: Cms) {
	// Arrange
	let page = cms
		.pages()
		.create_page(CreatePage::new("Contact", "en").reverse_id("contact"))
		.await
		.unwrap();

	// Act
	let found = cms.pages().get_page_by_reverse_id(1, "contact").await.unwrap();
	let duplicate = cms
		.pages()
		.create_page(CreatePage::new("Other", "en").reverse_id("contact"))
		.await;

	// Assert
	assert_eq!(found.id, page.id);
	assert!(matches!(
		duplicate,
		Err(CmsError::Validation(ValidationError::DuplicateReverseId { .. }))
	));
}

#[rstest]
#[tokio::test]
async fn test_invalidations_follow_commit(cms: Cms) {
	// Arrange
	let before = cms.invalidator().history().len();

	// Act
	let page = create(&cms, "page", None).await;
	let failed = cms
		.pages()
		.create_page(CreatePage::new("page", "en"))
		.await;

	// Assert
	assert!(failed.is_err());
	let history = cms.invalidator().history();
	assert_eq!(
		&history[before..],
		&[InvalidationTarget::PageCache(1), InvalidationTarget::MenuCache(1)]
	);
	cms.pages()
		.set_application(page.id, Some("blog.urls"), Some("blog"), "admin")
		.await
		.unwrap();
	assert_eq!(cms.invalidator().apphook_reloads(), 1);
}

#[rstest]
#[tokio::test]
async fn test_plugins_share_their_slot_placeholder(cms: Cms) {
	// Arrange
	let page = create(&cms, "page", None).await;
	let pages = cms.pages();

	// Act
	let first = pages
		.add_plugin(page.id, "en", "content", "TextPlugin", serde_json::json!({"body": "one"}), None)
		.await
		.unwrap();
	let second = pages
		.add_plugin(page.id, "en", "content", "TextPlugin", serde_json::json!({"body": "two"}), None)
		.await
		.unwrap();
	let nested = pages
		.add_plugin(page.id, "en", "content", "LinkPlugin", serde_json::json!({}), Some(first.id))
		.await
		.unwrap();
	let sidebar = pages
		.add_plugin(page.id, "en", "sidebar", "TextPlugin", serde_json::json!({}), None)
		.await
		.unwrap();
	let missing = pages
		.add_plugin(page.id, "de", "content", "TextPlugin", serde_json::json!({}), None)
		.await;

	// Assert
	assert_eq!(first.placeholder, second.placeholder);
	assert_eq!(nested.placeholder, first.placeholder);
	assert_ne!(sidebar.placeholder, first.placeholder);
	assert_eq!((first.position, second.position, nested.position), (1, 2, 1));
	assert!(matches!(
		missing,
		Err(CmsError::Validation(ValidationError::MissingLanguage { .. }))
	));
	let tx = cms.store().read().await;
	let content = tx.content_for(page.id, "en").unwrap().id;
	assert_eq!(tx.placeholders_of(content).count(), 2);
	assert_eq!(tx.plugins_of(first.placeholder).len(), 3);
}
