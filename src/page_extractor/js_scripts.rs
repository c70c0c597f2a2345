//! JavaScript evaluated inside gallery item pages.
//!
//! Each script is an IIFE returning plain JSON so the result deserializes
//! directly with serde.

/// Click whatever tab or button reveals the code panel.
///
/// Matches by case-insensitive containment so variants like "View Code" and
/// "Show code" are caught. Returns the number of elements clicked so the
/// caller can tell whether the page had a code tab at all.
pub const CODE_TAB_CLICK_SCRIPT: &str = r#"
    (() => {
        let clicked = 0;
        document.querySelectorAll('button, [role="tab"], a').forEach(el => {
            const label = (el.textContent || '').trim().toLowerCase();
            if (label.includes('code')) {
                el.click();
                clicked += 1;
            }
        });
        return clicked;
    })()
"#;

/// Extract the component's name, description, props table and dependency list
/// from the rendered DOM.
///
/// Heuristics mirror the gallery's page layout: the item name sits in the
/// first `h2` (older layouts used `h1`), the description in the meta tag or
/// first paragraph, props in the first table with positional columns, and
/// dependencies in the sibling of a "Dependencies" heading.
pub const COMPONENT_INFO_SCRIPT: &str = r#"
    (() => {
        const name =
            document.querySelector('h2')?.textContent?.trim() ||
            document.querySelector('h1')?.textContent?.trim() ||
            'Unknown Component';

        const description =
            document.querySelector('meta[name="description"]')?.getAttribute('content') ||
            document.querySelector('p')?.textContent?.trim() ||
            '';

        const props = [];
        const table = document.querySelector('table');
        if (table) {
            const rows = Array.from(table.querySelectorAll('tr')).slice(1);
            for (const row of rows) {
                const cells = Array.from(row.querySelectorAll('td, th'))
                    .map(cell => (cell.textContent || '').trim());
                if (cells.length >= 2 && cells.length <= 5 && cells[0]) {
                    // Three columns means the table has no default column.
                    props.push(cells.length === 3
                        ? {
                            name: cells[0],
                            type: cells[1] || '',
                            default: '',
                            description: cells[2] || ''
                        }
                        : {
                            name: cells[0],
                            type: cells[1] || '',
                            default: cells[2] || '',
                            description: cells[3] || cells[4] || ''
                        });
                }
            }
        }

        let dependencies = [];
        const headings = Array.from(document.querySelectorAll('h2, h3, h4'));
        const depHeading = headings.find(h =>
            (h.textContent || '').toLowerCase().includes('dependencies'));
        if (depHeading && depHeading.nextElementSibling) {
            dependencies = (depHeading.nextElementSibling.textContent || '')
                .split('\n')
                .map(d => d.trim())
                .filter(d => d.length > 0);
        }

        return { name, description, props, dependencies };
    })()
"#;

/// Collect the text of every element matching the code-block selectors.
pub fn code_blocks_script(selectors: &str) -> String {
    format!(
        r#"
    (() => {{
        const blocks = [];
        document.querySelectorAll(`{selectors}`).forEach(el => {{
            const text = (el.textContent || '').trim();
            if (text.length > 0) {{
                blocks.push(text);
            }}
        }});
        return blocks;
    }})()
"#
    )
}

/// Find the bounding rectangle of the live preview pane, if one is visible.
///
/// Returns `null` when no candidate has a positive area, in which case the
/// caller falls back to a full-viewport screenshot.
pub const PREVIEW_RECT_SCRIPT: &str = r#"
    (() => {
        const selectors = [
            '[class*="preview"]',
            '[class*="Preview"]',
            '[class*="demo"]',
            'main canvas',
            'main section'
        ];
        for (const selector of selectors) {
            const el = document.querySelector(selector);
            if (el) {
                const rect = el.getBoundingClientRect();
                if (rect.width > 50 && rect.height > 50) {
                    return {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height
                    };
                }
            }
        }
        return null;
    })()
"#;

/// Report whether the document has finished loading.
pub const READY_STATE_SCRIPT: &str = r#"
    (() => {
        return {
            readyState: document.readyState,
            bodyExists: document.body !== null
        };
    })()
"#;
