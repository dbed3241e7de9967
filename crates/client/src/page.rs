use std::{
    any::type_name,
    cell::{Cell, RefCell},
    rc::Rc,
};

use gloo::{dialogs::alert, events::EventListener, utils::document};
use thiserror::Error;
use tracing::{debug, error};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use crate::{
    api::HttpApi,
    workflow::{ExerciseForm, Step, Workflow, WorkflowError},
};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Missing element #{0}")]
    Missing(&'static str),
    #[error("Element #{0} isn't a {1}")]
    WrongType(&'static str, &'static str),
}

fn element<T: JsCast>(id: &'static str) -> Result<T, PageError> {
    document()
        .get_element_by_id(id)
        .ok_or(PageError::Missing(id))?
        .dyn_into::<T>()
        .map_err(|_| PageError::WrongType(id, type_name::<T>()))
}

/// Section and progress step ids, in `Step::ALL` order
const SECTION_IDS: [&str; 3] = ["step-user", "step-exercise", "step-summary"];
const PROGRESS_IDS: [&str; 3] = ["progress-user", "progress-exercise", "progress-summary"];

struct Elements {
    sections: Vec<HtmlElement>,
    progress: Vec<Element>,
    username: HtmlInputElement,
    description: HtmlInputElement,
    duration: HtmlInputElement,
    date: HtmlInputElement,
    log_description: HtmlElement,
    log_duration: HtmlElement,
    log_date: HtmlElement,
}

impl Elements {
    fn find() -> Result<Self, PageError> {
        Ok(Self {
            sections: SECTION_IDS
                .into_iter()
                .map(element::<HtmlElement>)
                .collect::<Result<_, _>>()?,
            progress: PROGRESS_IDS
                .into_iter()
                .map(element::<Element>)
                .collect::<Result<_, _>>()?,
            username: element("uname")?,
            description: element("desc")?,
            duration: element("dur")?,
            date: element("date")?,
            log_description: element("log-description")?,
            log_duration: element("log-duration")?,
            log_date: element("log-date")?,
        })
    }

    fn exercise_form(&self) -> ExerciseForm {
        ExerciseForm {
            description: self.description.value(),
            duration: self.duration.value(),
            date: self.date.value(),
        }
    }

    fn clear_inputs(&self) {
        for input in [&self.username, &self.description, &self.duration, &self.date] {
            input.set_value("");
        }
    }
}

/// Binds a [`Workflow`] to the form on the page
#[derive(Clone)]
struct Page {
    elements: Rc<Elements>,
    workflow: Rc<RefCell<Workflow>>,
    busy: Rc<Cell<bool>>,
}

impl Page {
    fn render(&self) {
        let workflow = self.workflow.borrow();

        for step in Step::ALL {
            let index = step.index();
            self.elements.sections[index].set_hidden(step != workflow.step());
            if let Err(e) = self.elements.progress[index]
                .class_list()
                .toggle_with_force("active", workflow.is_active(step))
            {
                error!(?e, "Failed to update progress");
            }
        }

        let entry = workflow.last_entry();
        self.elements
            .log_description
            .set_text_content(entry.and_then(|entry| entry.description.as_deref()));
        self.elements.log_duration.set_text_content(
            entry
                .and_then(|entry| entry.duration)
                .map(|minutes| format!("{minutes} minutes"))
                .as_deref(),
        );
        self.elements
            .log_date
            .set_text_content(entry.map(|entry| entry.date.to_string()).as_deref());
    }

    /// Takes a copy of the workflow for an async action. Returns `None` while
    /// another action is still running
    fn begin(&self) -> Option<Workflow> {
        if self.busy.replace(true) {
            debug!("Ignoring action, busy");
            return None;
        }
        Some(self.workflow.borrow().clone())
    }

    fn finish(&self, workflow: Workflow, result: Result<(), WorkflowError>) {
        *self.workflow.borrow_mut() = workflow;
        self.busy.set(false);
        self.render();

        if let Err(e) = result {
            error!(%e, "Action failed");
            alert(&e.to_string());
        }
    }

    fn next(&self) {
        let Some(mut workflow) = self.begin() else {
            return;
        };
        let page = self.clone();
        let username = self.elements.username.value();

        spawn_local(async move {
            let result = workflow.create_user(&HttpApi, &username).await;
            page.finish(workflow, result);
        });
    }

    fn submit(&self) {
        let Some(mut workflow) = self.begin() else {
            return;
        };
        let page = self.clone();
        let form = self.elements.exercise_form();

        spawn_local(async move {
            let result = workflow.submit(&HttpApi, &form).await;
            page.finish(workflow, result);
        });
    }

    fn previous(&self) {
        if self.busy.get() {
            return;
        }
        self.workflow.borrow_mut().previous();
        self.render();
    }

    fn restart(&self) {
        if self.busy.get() {
            return;
        }
        self.workflow.borrow_mut().restart();
        self.elements.clear_inputs();
        self.render();
    }

    fn on_click(&self, id: &'static str, handler: fn(&Page)) -> Result<(), PageError> {
        let button: HtmlElement = element(id)?;
        let page = self.clone();
        EventListener::new(&button, "click", move |_| handler(&page)).forget();
        Ok(())
    }
}

/// Finds the form elements, hooks up the buttons and shows the first step
pub fn mount() -> Result<(), PageError> {
    let page = Page {
        elements: Rc::new(Elements::find()?),
        workflow: Rc::new(RefCell::new(Workflow::new())),
        busy: Rc::new(Cell::new(false)),
    };

    // The buttons drive everything, pressing enter shouldn't reload the page
    let form: HtmlElement = element("workflow")?;
    EventListener::new(&form, "submit", |event| event.prevent_default()).forget();

    page.on_click("next", Page::next)?;
    page.on_click("previous", Page::previous)?;
    page.on_click("submit", Page::submit)?;
    page.on_click("restart", Page::restart)?;

    page.render();
    Ok(())
}
