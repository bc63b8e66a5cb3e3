//! In-page scripts and selectors shared by the discovery components.
//!
//! Each probe is a function declaration evaluated with the element bound to
//! `this`, so it always runs against the element's own document and window.

/// Elements considered by a pass: everything under `body`, plus anything
/// carrying one of the attributes the locator rules key on.
pub const CANDIDATE_SELECTOR: &str = "body *, [data-testid], [data-test-id], [name]";

/// Computed style and content-box size, decoded as [`crate::visibility::StyleProbe`].
pub const STYLE_PROBE: &str = r#"function() {
    const view = this.ownerDocument.defaultView;
    const style = view.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    const px = (value) => parseFloat(value) || 0;
    const width = rect.width
        - px(style.paddingLeft) - px(style.paddingRight)
        - px(style.borderLeftWidth) - px(style.borderRightWidth);
    const height = rect.height
        - px(style.paddingTop) - px(style.paddingBottom)
        - px(style.borderTopWidth) - px(style.borderBottomWidth);
    return {
        display: style.display,
        visibility: style.visibility,
        opacity: style.opacity,
        contentWidth: width,
        contentHeight: height,
    };
}"#;

/// Everything the locator and name rules need, decoded as [`crate::facts::ElementFacts`].
pub const FACTS_PROBE: &str = r#"function() {
    const el = this;
    const doc = el.ownerDocument;
    const attr = (name) => el.getAttribute(name);
    const rendered = (node) => ((node.innerText ?? node.textContent) || '').trim();
    const id = attr('id');
    let labelText = null;
    if (id) {
        const label = Array.from(doc.getElementsByTagName('label')).find((l) => l.htmlFor === id);
        if (label) labelText = rendered(label);
    }
    const parent = el.parentElement;
    let sameTagIndex = null;
    if (parent) {
        const siblings = Array.from(parent.children).filter((c) => c.tagName === el.tagName);
        sameTagIndex = siblings.indexOf(el) + 1;
    }
    const rawClass = typeof el.className === 'string' ? el.className : (attr('class') || '');
    return {
        tag: el.tagName.toLowerCase(),
        id: id,
        testId: attr('data-testid'),
        legacyTestId: attr('data-test-id'),
        name: attr('name'),
        role: attr('role'),
        type: attr('type'),
        title: attr('title'),
        ariaLabel: attr('aria-label'),
        placeholder: attr('placeholder'),
        alt: attr('alt'),
        classes: rawClass.split(' '),
        idCount: id ? doc.querySelectorAll('#' + CSS.escape(id)).length : 0,
        labelText: labelText,
        parentLabelText: parent && parent.tagName === 'LABEL' ? rendered(parent) : null,
        text: rendered(el),
        sameTagIndex: sameTagIndex,
    };
}"#;
